//! Viewer-scoped feed state with stale-load protection.
//!
//! Each load takes a ticket from `LoadSequencer`. When a newer load has
//! started by the time an older one finishes, the older result (success or
//! error) is discarded, so rapid filter/sort changes always end on the most
//! recently requested feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;
use uuid::Uuid;

use crate::domain::{AnnotatedPost, FeedFilter, FeedRequest, InteractionState, SortMode};
use crate::error::{ServiceError, ServiceResult};
use crate::services::{FeedAggregator, InteractionService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct LoadSequencer {
    latest: AtomicU64,
}

impl LoadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load; every earlier ticket becomes stale
    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }
}

/// What happened to a finished load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The visible list was replaced with this many posts
    Applied(usize),
    /// A newer load started first; the result was dropped
    Superseded,
}

#[derive(Debug, Default)]
struct SessionState {
    filter: FeedFilter,
    sort: SortMode,
    posts: Vec<AnnotatedPost>,
}

pub struct FeedSession {
    aggregator: FeedAggregator,
    interactions: InteractionService,
    viewer: Option<Uuid>,
    sequencer: LoadSequencer,
    state: Mutex<SessionState>,
}

impl FeedSession {
    pub fn new(
        aggregator: FeedAggregator,
        interactions: InteractionService,
        viewer: Option<Uuid>,
    ) -> Self {
        Self {
            aggregator,
            interactions,
            viewer,
            sequencer: LoadSequencer::new(),
            state: Mutex::new(SessionState::default()),
        }
    }

    // Never held across an await
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn viewer(&self) -> Option<Uuid> {
        self.viewer
    }

    pub fn filter(&self) -> FeedFilter {
        self.state().filter
    }

    pub fn sort(&self) -> SortMode {
        self.state().sort
    }

    /// Currently visible posts
    pub fn posts(&self) -> Vec<AnnotatedPost> {
        self.state().posts.clone()
    }

    /// Reload with the current filter and sort.
    ///
    /// A failed current load returns the error and leaves the visible list
    /// as it was.
    pub async fn refresh(&self) -> ServiceResult<LoadOutcome> {
        let ticket = self.sequencer.begin();
        let request = {
            let state = self.state();
            FeedRequest::new(state.filter, state.sort, self.viewer)
        };

        let result = self.aggregator.load_feed(&request).await;

        let mut state = self.state();
        if !self.sequencer.is_current(ticket) {
            debug!(ticket = ticket.0, "Discarding superseded feed load");
            return Ok(LoadOutcome::Superseded);
        }

        let posts = result?;
        let count = posts.len();
        state.posts = posts;
        Ok(LoadOutcome::Applied(count))
    }

    pub async fn set_filter(&self, filter: FeedFilter) -> ServiceResult<LoadOutcome> {
        self.state().filter = filter;
        self.refresh().await
    }

    pub async fn set_sort(&self, sort: SortMode) -> ServiceResult<LoadOutcome> {
        self.state().sort = sort;
        self.refresh().await
    }

    /// Toggle the viewer's like, then reload
    pub async fn toggle_like(&self, post_id: Uuid) -> ServiceResult<(InteractionState, LoadOutcome)> {
        let viewer = self.require_viewer()?;
        let state = self.interactions.toggle_like(post_id, viewer).await?;
        Ok((state, self.refresh().await?))
    }

    /// Toggle the viewer's bookmark, then reload
    pub async fn toggle_bookmark(
        &self,
        post_id: Uuid,
    ) -> ServiceResult<(InteractionState, LoadOutcome)> {
        let viewer = self.require_viewer()?;
        let state = self.interactions.toggle_bookmark(post_id, viewer).await?;
        Ok((state, self.refresh().await?))
    }

    fn require_viewer(&self) -> ServiceResult<Uuid> {
        self.viewer
            .ok_or_else(|| ServiceError::Unauthorized("sign in to like or bookmark posts".into()))
    }
}

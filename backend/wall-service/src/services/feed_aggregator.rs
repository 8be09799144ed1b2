//! Feed aggregation: candidate posts merged with authors, engagement counts
//! and the viewer's own likes/bookmarks.
//!
//! One load issues a fixed number of store queries regardless of feed size:
//! - candidate resolution (plus the viewer's id set for liked/bookmarked)
//! - like rows, bookmark rows, viewer likes, viewer bookmarks and author
//!   summaries, all scoped to the candidate ids and run with `try_join!`
//!
//! Every count and flag in one result comes from that single snapshot.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    AnnotatedPost, AuthorSummary, FeedFilter, FeedRequest, InteractionKind, Post, SortMode,
};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics;
use crate::repository::{InteractionFilter, PostScope, WallStore};
use crate::services::FeedCache;

/// Interaction rows tallied for one feed render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngagementSnapshot {
    like_counts: HashMap<Uuid, u64>,
    bookmark_counts: HashMap<Uuid, u64>,
    viewer_liked: HashSet<Uuid>,
    viewer_bookmarked: HashSet<Uuid>,
}

impl EngagementSnapshot {
    /// Build count maps and viewer sets from raw `post_id` columns
    pub fn tally(
        likes: Vec<Uuid>,
        bookmarks: Vec<Uuid>,
        viewer_likes: Vec<Uuid>,
        viewer_bookmarks: Vec<Uuid>,
    ) -> Self {
        Self {
            like_counts: count_by_post(likes),
            bookmark_counts: count_by_post(bookmarks),
            viewer_liked: viewer_likes.into_iter().collect(),
            viewer_bookmarked: viewer_bookmarks.into_iter().collect(),
        }
    }

    pub fn like_count(&self, post_id: &Uuid) -> u64 {
        self.like_counts.get(post_id).copied().unwrap_or(0)
    }

    pub fn bookmark_count(&self, post_id: &Uuid) -> u64 {
        self.bookmark_counts.get(post_id).copied().unwrap_or(0)
    }

    pub fn viewer_liked(&self, post_id: &Uuid) -> bool {
        self.viewer_liked.contains(post_id)
    }

    pub fn viewer_bookmarked(&self, post_id: &Uuid) -> bool {
        self.viewer_bookmarked.contains(post_id)
    }
}

fn count_by_post(post_ids: Vec<Uuid>) -> HashMap<Uuid, u64> {
    let mut counts = HashMap::new();
    for post_id in post_ids {
        *counts.entry(post_id).or_insert(0) += 1;
    }
    counts
}

/// Merge posts with authors and engagement, then apply the likes sort.
///
/// `posts` must already be in fetch order; `MostLiked` is a stable sort so
/// equal counts keep that order.
pub fn annotate(
    posts: Vec<Post>,
    authors: Vec<AuthorSummary>,
    snapshot: &EngagementSnapshot,
    sort: SortMode,
) -> Vec<AnnotatedPost> {
    let authors: HashMap<Uuid, AuthorSummary> =
        authors.into_iter().map(|a| (a.id, a)).collect();

    let mut annotated: Vec<AnnotatedPost> = posts
        .into_iter()
        .map(|post| {
            let author = match authors.get(&post.user_id) {
                Some(author) => author.clone(),
                None => {
                    warn!(
                        post_id = %post.id,
                        user_id = %post.user_id,
                        "Author not found, using placeholder"
                    );
                    AuthorSummary::unknown(post.user_id)
                }
            };

            AnnotatedPost {
                author,
                like_count: snapshot.like_count(&post.id),
                bookmark_count: snapshot.bookmark_count(&post.id),
                viewer_liked: snapshot.viewer_liked(&post.id),
                viewer_bookmarked: snapshot.viewer_bookmarked(&post.id),
                post,
            }
        })
        .collect();

    if sort.sorts_by_likes() {
        annotated.sort_by(|a, b| b.like_count.cmp(&a.like_count));
    }

    annotated
}

/// Order-preserving dedupe
fn distinct(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[derive(Clone)]
pub struct FeedAggregator {
    store: Arc<dyn WallStore>,
    cache: Option<Arc<FeedCache>>,
}

impl FeedAggregator {
    pub fn new(store: Arc<dyn WallStore>) -> Self {
        Self { store, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<FeedCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<FeedCache>> {
        self.cache.as_ref()
    }

    /// Load the annotated feed for `request`.
    ///
    /// Any failed fetch aborts the whole load with `FeedUnavailable`; no
    /// partial feed is ever returned.
    #[instrument(
        skip(self),
        fields(filter = request.filter.label(), sort = request.sort.label())
    )]
    pub async fn load_feed(&self, request: &FeedRequest) -> ServiceResult<Vec<AnnotatedPost>> {
        let filter = request.filter.label();

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(request)) {
            debug!(posts = cached.len(), "Feed served from cache");
            metrics::record_feed_load(filter, "cached");
            return Ok(cached.as_ref().clone());
        }
        let generation = self.cache.as_ref().map(|c| c.generation());

        let started = Instant::now();
        let result = self.aggregate(request).await;
        metrics::record_feed_duration(filter, request.sort.label(), started.elapsed());

        match result {
            Ok(posts) => {
                let outcome = if posts.is_empty() { "empty" } else { "success" };
                metrics::record_feed_load(filter, outcome);
                info!(
                    posts = posts.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Feed loaded"
                );

                if let (Some(cache), Some(generation)) = (&self.cache, generation) {
                    cache.insert(*request, generation, Arc::new(posts.clone()));
                }
                Ok(posts)
            }
            Err(e) => {
                metrics::record_feed_load(filter, "error");
                error!("Feed load failed: {:#}", e);
                Err(ServiceError::FeedUnavailable(e))
            }
        }
    }

    async fn aggregate(&self, request: &FeedRequest) -> Result<Vec<AnnotatedPost>> {
        let candidates = self.resolve_candidates(request).await?;
        if candidates.is_empty() {
            debug!("No candidate posts");
            return Ok(vec![]);
        }

        let post_ids: Vec<Uuid> = candidates.iter().map(|p| p.id).collect();
        let author_ids = distinct(candidates.iter().map(|p| p.user_id));
        let scope = InteractionFilter::for_posts(post_ids.clone());

        debug!(
            candidates = post_ids.len(),
            authors = author_ids.len(),
            "Fetching engagement and authors"
        );

        let (likes, bookmarks, viewer_likes, viewer_bookmarks, authors) = tokio::try_join!(
            self.store.interaction_post_ids(InteractionKind::Like, &scope),
            self.store
                .interaction_post_ids(InteractionKind::Bookmark, &scope),
            self.viewer_post_ids(InteractionKind::Like, request.viewer, &post_ids),
            self.viewer_post_ids(InteractionKind::Bookmark, request.viewer, &post_ids),
            self.store.author_summaries(&author_ids),
        )?;

        let snapshot = EngagementSnapshot::tally(likes, bookmarks, viewer_likes, viewer_bookmarks);
        Ok(annotate(candidates, authors, &snapshot, request.sort))
    }

    /// Candidate posts in fetch order
    async fn resolve_candidates(&self, request: &FeedRequest) -> Result<Vec<Post>> {
        let order = request.sort.fetch_order();

        match request.filter {
            FeedFilter::All => self.store.list_posts(&PostScope::All, order).await,
            FeedFilter::ByAuthor(author_id) => {
                self.store
                    .list_posts(&PostScope::Author(author_id), order)
                    .await
            }
            FeedFilter::LikedByViewer | FeedFilter::BookmarkedByViewer => {
                let Some(viewer) = request.viewer else {
                    debug!("Anonymous viewer has no interaction history");
                    return Ok(vec![]);
                };
                let Some(kind) = request.filter.interaction_kind() else {
                    return Ok(vec![]);
                };

                let ids = distinct(
                    self.store
                        .interaction_post_ids(kind, &InteractionFilter::by_user(viewer))
                        .await?,
                );
                if ids.is_empty() {
                    return Ok(vec![]);
                }

                self.store.list_posts(&PostScope::Ids(ids), order).await
            }
        }
    }

    async fn viewer_post_ids(
        &self,
        kind: InteractionKind,
        viewer: Option<Uuid>,
        post_ids: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        match viewer {
            Some(viewer) => {
                self.store
                    .interaction_post_ids(
                        kind,
                        &InteractionFilter::by_user_for_posts(viewer, post_ids.to_vec()),
                    )
                    .await
            }
            None => Ok(vec![]),
        }
    }
}

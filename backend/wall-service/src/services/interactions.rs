use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{InteractionKind, InteractionState, ToggleOutcome};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics;
use crate::repository::WallStore;
use crate::services::FeedCache;

/// Like/bookmark toggles.
///
/// A toggle never patches a rendered feed; callers reload through
/// `FeedAggregator` afterwards.
#[derive(Clone)]
pub struct InteractionService {
    store: Arc<dyn WallStore>,
    cache: Option<Arc<FeedCache>>,
}

impl InteractionService {
    pub fn new(store: Arc<dyn WallStore>) -> Self {
        Self { store, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<FeedCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn toggle_like(&self, post_id: Uuid, viewer: Uuid) -> ServiceResult<InteractionState> {
        self.toggle(InteractionKind::Like, post_id, viewer).await
    }

    pub async fn toggle_bookmark(
        &self,
        post_id: Uuid,
        viewer: Uuid,
    ) -> ServiceResult<InteractionState> {
        self.toggle(InteractionKind::Bookmark, post_id, viewer).await
    }

    async fn toggle(
        &self,
        kind: InteractionKind,
        post_id: Uuid,
        viewer: Uuid,
    ) -> ServiceResult<InteractionState> {
        let outcome = self
            .store
            .toggle_interaction(kind, viewer, post_id)
            .await
            .map_err(|e| {
                error!(kind = kind.as_str(), %post_id, "Toggle failed: {:#}", e);
                ServiceError::Store(e)
            })?;

        let active = match outcome {
            ToggleOutcome::Toggled(active) => active,
            ToggleOutcome::MissingPost => {
                return Err(ServiceError::NotFound(format!("post {}", post_id)));
            }
            ToggleOutcome::MissingUser => {
                warn!(user_id = %viewer, "Toggle from unknown user");
                return Err(ServiceError::Unauthorized(format!("unknown user {}", viewer)));
            }
        };

        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }

        metrics::record_toggle(kind.as_str(), active);
        info!(kind = kind.as_str(), %post_id, user_id = %viewer, active, "Interaction toggled");

        Ok(InteractionState {
            post_id,
            kind,
            active,
        })
    }
}

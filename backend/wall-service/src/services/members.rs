use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::{AuthorStats, Member};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::WallStore;

/// Member directory: every public profile with the engagement its posts
/// have received.
#[derive(Clone)]
pub struct MemberDirectory {
    store: Arc<dyn WallStore>,
}

impl MemberDirectory {
    pub fn new(store: Arc<dyn WallStore>) -> Self {
        Self { store }
    }

    /// Newest member first. Stats for all members come from one batched
    /// query; members without posts get zeros.
    pub async fn list_members(&self) -> ServiceResult<Vec<Member>> {
        let profiles = self.store.list_members().await.map_err(|e| {
            error!("Failed to list members: {:#}", e);
            ServiceError::Store(e)
        })?;

        if profiles.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
        let stats: HashMap<Uuid, AuthorStats> = self
            .store
            .author_stats(&ids)
            .await
            .map_err(|e| {
                error!("Failed to load member stats: {:#}", e);
                ServiceError::Store(e)
            })?
            .into_iter()
            .map(|s| (s.user_id, s))
            .collect();

        debug!(members = profiles.len(), with_posts = stats.len(), "Members loaded");

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let stats = stats.get(&profile.id).copied().unwrap_or(AuthorStats {
                    user_id: profile.id,
                    ..AuthorStats::default()
                });
                Member { profile, stats }
            })
            .collect())
    }
}

use anyhow::Result;
use uuid::Uuid;

use crate::domain::{
    AuthorStats, AuthorSummary, CreatedAtOrder, InteractionKind, NewPost, Post, ProfileUpdate,
    ProfileUpdateOutcome, ToggleOutcome, UserProfile,
};

/// Which posts to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostScope {
    All,
    Author(Uuid),
    Ids(Vec<Uuid>),
}

/// Row filter for interaction lookups. An empty filter reads the whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionFilter {
    pub user_id: Option<Uuid>,
    pub post_ids: Option<Vec<Uuid>>,
}

impl InteractionFilter {
    pub fn by_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            post_ids: None,
        }
    }

    pub fn for_posts(post_ids: Vec<Uuid>) -> Self {
        Self {
            user_id: None,
            post_ids: Some(post_ids),
        }
    }

    pub fn by_user_for_posts(user_id: Uuid, post_ids: Vec<Uuid>) -> Self {
        Self {
            user_id: Some(user_id),
            post_ids: Some(post_ids),
        }
    }

    pub fn matches(&self, user_id: Uuid, post_id: Uuid) -> bool {
        self.user_id.map_or(true, |u| u == user_id)
            && self
                .post_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&post_id))
    }
}

/// Query capability of the managed store.
///
/// `PgWallStore` implements it over PostgreSQL; services only see this
/// trait, so every pipeline can run against an in-memory store in tests.
#[async_trait::async_trait]
pub trait WallStore: Send + Sync {
    /// Fetch posts in `scope`, ordered by `created_at`
    async fn list_posts(&self, scope: &PostScope, order: CreatedAtOrder) -> Result<Vec<Post>>;

    /// `post_id` of every interaction row matching `filter`, one entry per row
    async fn interaction_post_ids(
        &self,
        kind: InteractionKind,
        filter: &InteractionFilter,
    ) -> Result<Vec<Uuid>>;

    /// Author projections for the given ids. Unknown ids are simply absent.
    async fn author_summaries(&self, author_ids: &[Uuid]) -> Result<Vec<AuthorSummary>>;

    /// Delete the (user, post) interaction if present, insert it otherwise.
    /// A post or user that does not exist is an outcome, not an error.
    async fn toggle_interaction(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<ToggleOutcome>;

    async fn insert_post(&self, post: &NewPost) -> Result<Post>;

    /// Public profiles, newest member first
    async fn list_members(&self) -> Result<Vec<UserProfile>>;

    /// Post and engagement totals for the given authors
    async fn author_stats(&self, author_ids: &[Uuid]) -> Result<Vec<AuthorStats>>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<ProfileUpdateOutcome>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_filter_matches() {
        let user = Uuid::new_v4();
        let post = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(InteractionFilter::default().matches(other, other));
        assert!(InteractionFilter::by_user(user).matches(user, post));
        assert!(!InteractionFilter::by_user(user).matches(other, post));
        assert!(InteractionFilter::for_posts(vec![post]).matches(other, post));
        assert!(!InteractionFilter::for_posts(vec![post]).matches(user, other));
        assert!(!InteractionFilter::by_user_for_posts(user, vec![post]).matches(user, other));
    }
}

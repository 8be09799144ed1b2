pub mod interactions;
pub mod posts;
pub mod store;
pub mod users;

pub use interactions::InteractionRepository;
pub use posts::PostRepository;
pub use store::{InteractionFilter, PostScope, WallStore};
pub use users::UserRepository;

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    AuthorStats, AuthorSummary, CreatedAtOrder, InteractionKind, NewPost, Post, ProfileUpdate,
    ProfileUpdateOutcome, ToggleOutcome, UserProfile,
};

/// PostgreSQL-backed `WallStore`
#[derive(Clone)]
pub struct PgWallStore {
    pool: PgPool,
    posts: PostRepository,
    interactions: InteractionRepository,
    users: UserRepository,
}

impl PgWallStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            posts: PostRepository::new(pool.clone()),
            interactions: InteractionRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait::async_trait]
impl WallStore for PgWallStore {
    async fn list_posts(&self, scope: &PostScope, order: CreatedAtOrder) -> Result<Vec<Post>> {
        self.posts.list_posts(scope, order).await
    }

    async fn interaction_post_ids(
        &self,
        kind: InteractionKind,
        filter: &InteractionFilter,
    ) -> Result<Vec<Uuid>> {
        self.interactions.post_ids(kind, filter).await
    }

    async fn author_summaries(&self, author_ids: &[Uuid]) -> Result<Vec<AuthorSummary>> {
        self.users.get_author_summaries(author_ids).await
    }

    async fn toggle_interaction(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<ToggleOutcome> {
        self.interactions.toggle(kind, user_id, post_id).await
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        self.posts.create_post(post).await
    }

    async fn list_members(&self) -> Result<Vec<UserProfile>> {
        self.users.list_profiles().await
    }

    async fn author_stats(&self, author_ids: &[Uuid]) -> Result<Vec<AuthorStats>> {
        self.users.get_author_stats(author_ids).await
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        self.users.find_profile(user_id).await
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<ProfileUpdateOutcome> {
        self.users.update_profile(user_id, update).await
    }

    async fn health_check(&self) -> Result<()> {
        let _conn = db_pool::acquire_with_metrics(&self.pool, crate::SERVICE_NAME).await?;
        Ok(())
    }
}

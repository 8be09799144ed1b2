use crate::domain::{AuthorStats, AuthorSummary, ProfileUpdate, ProfileUpdateOutcome, UserProfile};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id, username, bio, avatar_url, email, linkedin_url, created_at";

/// Repository for the public side of the users table.
///
/// `password_hash` is owned by the identity service and is never selected here.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Batch fetch author projections
    pub async fn get_author_summaries(&self, user_ids: &[Uuid]) -> Result<Vec<AuthorSummary>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let authors = sqlx::query_as::<_, AuthorSummary>(
            r#"
            SELECT id, username, avatar_url
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    /// All public profiles, newest first
    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        let profiles = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    /// Posts written and likes/bookmarks received, for many authors at once
    pub async fn get_author_stats(&self, user_ids: &[Uuid]) -> Result<Vec<AuthorStats>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let stats = sqlx::query_as::<_, AuthorStats>(
            r#"
            SELECT
                p.user_id AS user_id,
                COUNT(DISTINCT p.id) AS posts_count,
                COALESCE(SUM(l.cnt), 0)::BIGINT AS likes_received,
                COALESCE(SUM(b.cnt), 0)::BIGINT AS bookmarks_received
            FROM posts p
            LEFT JOIN (
                SELECT post_id, COUNT(*) AS cnt FROM likes GROUP BY post_id
            ) l ON l.post_id = p.id
            LEFT JOIN (
                SELECT post_id, COUNT(*) AS cnt FROM bookmarks GROUP BY post_id
            ) b ON b.post_id = p.id
            WHERE p.user_id = ANY($1)
            GROUP BY p.user_id
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Update username, bio and avatar. A username held by someone else
    /// comes back as `UsernameTaken` rather than an error.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<ProfileUpdateOutcome> {
        let result = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            UPDATE users
            SET username = $2, bio = $3, avatar_url = $4
            WHERE id = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .bind(&update.username)
        .bind(update.bio.as_deref())
        .bind(update.avatar_url.as_deref())
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(profile)) => Ok(ProfileUpdateOutcome::Updated(profile)),
            Ok(None) => Ok(ProfileUpdateOutcome::NotFound),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(ProfileUpdateOutcome::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }
}

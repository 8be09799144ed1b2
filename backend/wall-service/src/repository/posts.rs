use crate::domain::{CreatedAtOrder, NewPost, Post};
use crate::repository::PostScope;
use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder};

const POST_COLUMNS: &str = "id, user_id, kind, file_url, caption, created_at";

/// Repository for Post operations
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch posts in scope, ordered by creation time
    pub async fn list_posts(&self, scope: &PostScope, order: CreatedAtOrder) -> Result<Vec<Post>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM posts", POST_COLUMNS));

        match scope {
            PostScope::All => {}
            PostScope::Author(user_id) => {
                query.push(" WHERE user_id = ").push_bind(*user_id);
            }
            PostScope::Ids(ids) => {
                query.push(" WHERE id = ANY(").push_bind(ids.clone()).push(")");
            }
        }

        // id breaks timestamp ties so repeated loads come back in the same order
        match order {
            CreatedAtOrder::Ascending => query.push(" ORDER BY created_at ASC, id ASC"),
            CreatedAtOrder::Descending => query.push(" ORDER BY created_at DESC, id DESC"),
        };

        let posts = query
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    /// Insert a post and return the stored row
    pub async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let created = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (user_id, kind, file_url, caption)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(post.user_id)
        .bind(post.kind)
        .bind(post.file_url.as_deref())
        .bind(post.caption.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}

use crate::domain::{InteractionKind, ToggleOutcome};
use crate::repository::InteractionFilter;
use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Foreign keys are named `{table}_user_fk` / `{table}_post_fk` in the schema
fn missing_reference(constraint: Option<&str>) -> ToggleOutcome {
    match constraint {
        Some(name) if name.ends_with("_user_fk") => ToggleOutcome::MissingUser,
        _ => ToggleOutcome::MissingPost,
    }
}

/// Repository for likes and bookmarks.
///
/// Both tables have the same shape, so every query takes the
/// `InteractionKind` and targets `kind.table()`.
#[derive(Clone)]
pub struct InteractionRepository {
    pool: PgPool,
}

impl InteractionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `post_id` column of every matching row (one entry per row, so the
    /// caller can tally counts)
    pub async fn post_ids(
        &self,
        kind: InteractionKind,
        filter: &InteractionFilter,
    ) -> Result<Vec<Uuid>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT post_id FROM {}", kind.table()));

        let mut separated = " WHERE ";
        if let Some(user_id) = filter.user_id {
            query.push(separated).push("user_id = ").push_bind(user_id);
            separated = " AND ";
        }
        if let Some(post_ids) = &filter.post_ids {
            query
                .push(separated)
                .push("post_id = ANY(")
                .push_bind(post_ids.clone())
                .push(")");
        }

        let post_ids: Vec<Uuid> = query
            .build_query_scalar::<Uuid>()
            .fetch_all(&self.pool)
            .await?;

        Ok(post_ids)
    }

    /// Delete-if-present-else-insert in one transaction.
    ///
    /// `Toggled(true)` when the interaction exists after the call. The
    /// `(user_id, post_id)` unique constraint makes a concurrent double
    /// insert collapse into one row; a foreign key violation on insert
    /// rolls back and reports which side is missing.
    pub async fn toggle(
        &self,
        kind: InteractionKind,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<ToggleOutcome> {
        let mut tx = self.pool.begin().await?;

        let delete_sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND post_id = $2",
            kind.table()
        );
        let removed = sqlx::query(&delete_sql)
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        let active = if removed.rows_affected() > 0 {
            false
        } else {
            let insert_sql = format!(
                r#"
                INSERT INTO {} (user_id, post_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, post_id) DO NOTHING
                "#,
                kind.table()
            );
            let inserted = sqlx::query(&insert_sql)
                .bind(user_id)
                .bind(post_id)
                .execute(&mut *tx)
                .await;
            match inserted {
                Ok(_) => true,
                Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                    return Ok(missing_reference(db_err.constraint()));
                }
                Err(e) => return Err(e.into()),
            }
        };

        tx.commit().await?;
        Ok(ToggleOutcome::Toggled(active))
    }
}

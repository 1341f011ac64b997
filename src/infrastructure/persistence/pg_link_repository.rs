//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::LinkRecord;
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, map_sqlx_error};

/// Primary key constraint of the `links` table.
const LINKS_PKEY: &str = "links_pkey";

/// PostgreSQL repository for link storage and retrieval.
///
/// Each method issues exactly one statement, so the statement is the commit
/// point: a caller that is cancelled after the statement completed cannot
/// cause a second write.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn map_insert_error(e: sqlx::Error, short_code: &str) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
        && matches!(db.constraint(), Some(LINKS_PKEY) | None)
    {
        return AppError::DuplicateCode {
            code: short_code.to_string(),
        };
    }

    map_sqlx_error(e)
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, short_code: &str, original_url: &str) -> Result<LinkRecord, AppError> {
        sqlx::query_as::<_, LinkRecord>(
            r#"
            INSERT INTO links (short_code, original_url)
            VALUES ($1, $2)
            RETURNING short_code, original_url, created_at, transition_count
            "#,
        )
        .bind(short_code)
        .bind(original_url)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| map_insert_error(e, short_code))
    }

    async fn find_by_code(&self, short_code: &str) -> Result<LinkRecord, AppError> {
        sqlx::query_as::<_, LinkRecord>(
            r#"
            SELECT short_code, original_url, created_at, transition_count
            FROM links
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::not_found(short_code))
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<LinkRecord>, AppError> {
        let row = sqlx::query_as::<_, LinkRecord>(
            r#"
            SELECT short_code, original_url, created_at, transition_count
            FROM links
            WHERE original_url = $1
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn increment_hit(&self, short_code: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE links
            SET transition_count = transition_count + 1
            WHERE short_code = $1
            RETURNING transition_count
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::not_found(short_code))
    }

    async fn resolve_and_increment(&self, short_code: &str) -> Result<LinkRecord, AppError> {
        sqlx::query_as::<_, LinkRecord>(
            r#"
            UPDATE links
            SET transition_count = transition_count + 1
            WHERE short_code = $1
            RETURNING short_code, original_url, created_at, transition_count
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::not_found(short_code))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}

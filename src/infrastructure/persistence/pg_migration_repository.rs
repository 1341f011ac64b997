//! PostgreSQL implementation of the migration-history repository.

use async_trait::async_trait;
use sqlx::{Executor, PgPool};
use std::sync::Arc;

use crate::domain::entities::{AppliedMigration, Migration};
use crate::domain::repositories::MigrationRepository;
use crate::error::MigrationError;

/// Advisory lock key guarding creation of the history table.
const HISTORY_LOCK_KEY: i64 = 0x6c6e_6b73_6d69_6772;

/// Stores migration history in `schema_migrations` and executes steps in
/// transactions.
///
/// `apply` inserts the history row *before* running the `up` SQL inside the
/// same transaction. A second instance applying the same version blocks on
/// that row's primary key until the first commits, then fails with a unique
/// violation and rolls back, leaving the schema untouched. Creating the
/// history table itself is serialized with a transaction-scoped advisory lock.
pub struct PgMigrationRepository {
    pool: Arc<PgPool>,
}

impl PgMigrationRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MigrationRepository for PgMigrationRepository {
    async fn ensure_history(&self) -> Result<(), MigrationError> {
        let mut tx = self.pool.begin().await?;

        // Concurrent `CREATE TABLE IF NOT EXISTS` on an empty database races on
        // the catalog; the lock makes the loser wait and then see the table.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(HISTORY_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version    BIGINT      PRIMARY KEY,
                name       TEXT        NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn applied(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        let rows = sqlx::query_as::<_, AppliedMigration>(
            "SELECT version, name, applied_at FROM schema_migrations ORDER BY version",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn apply(&self, migration: &Migration) -> Result<AppliedMigration, MigrationError> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, AppliedMigration>(
            r#"
            INSERT INTO schema_migrations (version, name)
            VALUES ($1, $2)
            RETURNING version, name, applied_at
            "#,
        )
        .bind(migration.version)
        .bind(migration.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                MigrationError::Conflict {
                    version: migration.version,
                }
            } else {
                MigrationError::Storage(e)
            }
        })?;

        (&mut *tx)
            .execute(migration.up)
            .await
            .map_err(|source| MigrationError::Failed {
                version: migration.version,
                name: migration.name,
                source,
            })?;

        tx.commit().await?;

        Ok(record)
    }

    async fn revert(&self, migration: &Migration) -> Result<(), MigrationError> {
        let down = migration
            .down
            .ok_or(MigrationError::Irreversible(migration.version))?;

        let mut tx = self.pool.begin().await?;

        (&mut *tx)
            .execute(down)
            .await
            .map_err(|source| MigrationError::Failed {
                version: migration.version,
                name: migration.name,
                source,
            })?;

        sqlx::query("DELETE FROM schema_migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

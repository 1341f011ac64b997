//! Repository trait for the migration-history table.

use crate::domain::entities::{AppliedMigration, Migration};
use crate::error::MigrationError;
use async_trait::async_trait;

/// Store-resident migration history plus the ability to execute migration steps.
///
/// Only [`crate::application::services::MigrationRunner`] talks to this trait,
/// and only during startup or explicit administrative commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MigrationRepository: Send + Sync {
    /// Creates the history table if it does not exist yet.
    async fn ensure_history(&self) -> Result<(), MigrationError>;

    /// Returns all recorded migrations ordered by version.
    async fn applied(&self) -> Result<Vec<AppliedMigration>, MigrationError>;

    /// Runs the `up` step and records the migration in one atomic unit.
    ///
    /// # Errors
    ///
    /// - [`MigrationError::Conflict`] if another instance recorded the same version first
    /// - [`MigrationError::Failed`] if the `up` step itself fails
    ///
    /// In both cases neither the schema change nor the history row persists.
    async fn apply(&self, migration: &Migration) -> Result<AppliedMigration, MigrationError>;

    /// Runs the `down` step and removes the history row in one atomic unit.
    async fn revert(&self, migration: &Migration) -> Result<(), MigrationError>;
}

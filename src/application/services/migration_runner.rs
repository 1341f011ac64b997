//! Ordered, idempotent schema migration runner.
//!
//! # State machine
//!
//! Each registry entry moves `Pending → Applying → Applied`, or
//! `Applying → Failed`. A failure aborts the remaining queue and is returned to
//! the caller, which must refuse to start serving.
//!
//! # History checks
//!
//! Before anything is executed the recorded history is compared against the
//! registry. The applied set must be exactly a prefix of the registry: an
//! unknown version, a renamed entry, or a pending version below an applied
//! one is rejected instead of silently skipped.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{
    AppliedMigration, Migration, MigrationReport, MigrationState, MigrationStatus,
    RollbackOutcome,
};
use crate::domain::repositories::MigrationRepository;
use crate::error::MigrationError;

/// Checks that versions start at 1 and increase by exactly 1.
///
/// # Errors
///
/// Returns [`MigrationError::InvalidRegistry`] describing the first problem found.
pub fn validate_registry(registry: &[Migration]) -> Result<(), MigrationError> {
    for (idx, migration) in registry.iter().enumerate() {
        let expected = idx as i64 + 1;
        if migration.version != expected {
            return Err(MigrationError::InvalidRegistry(format!(
                "expected version {expected} at position {idx}, found {}",
                migration.version
            )));
        }
        if migration.name.trim().is_empty() {
            return Err(MigrationError::InvalidRegistry(format!(
                "migration {} has an empty name",
                migration.version
            )));
        }
        if migration.up.trim().is_empty() {
            return Err(MigrationError::InvalidRegistry(format!(
                "migration {} has an empty up step",
                migration.version
            )));
        }
    }

    Ok(())
}

/// Applies registry migrations against a [`MigrationRepository`].
pub struct MigrationRunner<R: MigrationRepository + ?Sized> {
    repository: Arc<R>,
    registry: &'static [Migration],
}

impl<R: MigrationRepository + ?Sized> MigrationRunner<R> {
    /// Creates a runner after validating the registry.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::InvalidRegistry`] if versions are not `1, 2, 3, ...`.
    pub fn new(
        repository: Arc<R>,
        registry: &'static [Migration],
    ) -> Result<Self, MigrationError> {
        validate_registry(registry)?;
        Ok(Self {
            repository,
            registry,
        })
    }

    /// Applies every pending migration in ascending version order.
    ///
    /// When nothing is pending no step is executed and no history row is
    /// written.
    ///
    /// # Errors
    ///
    /// - History inconsistencies: [`MigrationError::UnknownVersion`],
    ///   [`MigrationError::NameMismatch`], [`MigrationError::Gap`]
    /// - [`MigrationError::Failed`] if an `up` step fails; later entries are not attempted
    /// - [`MigrationError::Conflict`] if another instance applied the same version first
    pub async fn run(&self) -> Result<MigrationReport, MigrationError> {
        self.repository.ensure_history().await?;
        let history = self.repository.applied().await?;
        let applied_count = self.check_history(&history)?;

        let mut report = MigrationReport {
            applied: Vec::new(),
            skipped: history.iter().map(|m| m.version).collect(),
        };

        let pending = &self.registry[applied_count..];
        if pending.is_empty() {
            tracing::info!(
                applied = applied_count,
                "Schema is up to date, no migrations to apply"
            );
            return Ok(report);
        }

        tracing::info!(
            pending = pending.len(),
            applied = applied_count,
            "Applying schema migrations"
        );

        for migration in pending {
            log_transition(migration, MigrationState::Applying);

            match self.repository.apply(migration).await {
                Ok(record) => {
                    log_transition(migration, MigrationState::Applied);
                    tracing::debug!(
                        version = record.version,
                        applied_at = %record.applied_at,
                        "Recorded migration"
                    );
                    metrics::counter!("migrations_applied_total").increment(1);
                    report.applied.push(migration.version);
                }
                Err(e) => {
                    log_transition(migration, MigrationState::Failed);
                    tracing::error!(
                        version = migration.version,
                        name = migration.name,
                        error = %e,
                        "Migration failed, aborting remaining migrations"
                    );
                    return Err(e);
                }
            }
        }

        tracing::info!(applied = report.applied.len(), "Schema migrations complete");

        Ok(report)
    }

    /// Reports each registry entry as applied or pending.
    pub async fn status(&self) -> Result<Vec<MigrationStatus>, MigrationError> {
        self.repository.ensure_history().await?;
        let history = self.repository.applied().await?;
        self.check_history(&history)?;

        let applied_at: HashMap<i64, _> = history
            .iter()
            .map(|record| (record.version, record.applied_at))
            .collect();

        Ok(self
            .registry
            .iter()
            .map(|migration| {
                let applied_at = applied_at.get(&migration.version).copied();
                MigrationStatus {
                    migration: *migration,
                    state: if applied_at.is_some() {
                        MigrationState::Applied
                    } else {
                        MigrationState::Pending
                    },
                    applied_at,
                }
            })
            .collect())
    }

    /// Reverts one migration and removes its history row.
    ///
    /// Only the most recently applied migration can be reverted; anything
    /// else would leave a gap that the next startup rejects. Reverting a
    /// version that is not applied is a no-op reported as
    /// [`RollbackOutcome::NotApplied`].
    ///
    /// # Errors
    ///
    /// - [`MigrationError::UnknownVersion`] if the registry has no such version
    /// - [`MigrationError::RollbackOutOfOrder`] if a later migration is still applied
    /// - [`MigrationError::Irreversible`] if the migration has no `down` step
    /// - [`MigrationError::Failed`] if the `down` step fails
    pub async fn rollback(&self, version: i64) -> Result<RollbackOutcome, MigrationError> {
        let migration = self
            .registry
            .iter()
            .find(|m| m.version == version)
            .ok_or(MigrationError::UnknownVersion(version))?;

        self.repository.ensure_history().await?;
        let history = self.repository.applied().await?;
        let applied_count = self.check_history(&history)?;

        if !history.iter().any(|record| record.version == version) {
            tracing::info!(version, name = migration.name, "Migration is not applied, nothing to roll back");
            return Ok(RollbackOutcome::NotApplied { version });
        }

        let latest = self.registry[applied_count - 1].version;
        if version != latest {
            return Err(MigrationError::RollbackOutOfOrder {
                requested: version,
                latest,
            });
        }
        if !migration.is_reversible() {
            return Err(MigrationError::Irreversible(version));
        }

        tracing::warn!(version, name = migration.name, "Rolling back migration");
        self.repository.revert(migration).await?;
        tracing::info!(version, name = migration.name, "Migration rolled back");

        Ok(RollbackOutcome::RolledBack { version })
    }

    /// Validates recorded history against the registry.
    ///
    /// Returns how many leading registry entries are applied.
    fn check_history(&self, history: &[AppliedMigration]) -> Result<usize, MigrationError> {
        for record in history {
            let Some(migration) = self.registry.iter().find(|m| m.version == record.version)
            else {
                return Err(MigrationError::UnknownVersion(record.version));
            };
            if migration.name != record.name {
                return Err(MigrationError::NameMismatch {
                    version: record.version,
                    recorded: record.name.clone(),
                    expected: migration.name,
                });
            }
        }

        let applied_count = self
            .registry
            .iter()
            .take_while(|m| history.iter().any(|record| record.version == m.version))
            .count();

        if let Some(missing) = self.registry.get(applied_count)
            && let Some(later) = history
                .iter()
                .map(|record| record.version)
                .filter(|&v| v > missing.version)
                .min()
        {
            return Err(MigrationError::Gap {
                missing: missing.version,
                later,
            });
        }

        Ok(applied_count)
    }
}

fn log_transition(migration: &Migration, state: MigrationState) {
    tracing::info!(
        version = migration.version,
        name = migration.name,
        state = %state,
        "Migration {}",
        migration
    );
}

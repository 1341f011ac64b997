//! Migration definitions and history records.

use chrono::{DateTime, Utc};
use std::fmt;

/// A single versioned schema change.
///
/// Registries are plain ordered slices of these entries; the runner never
/// dispatches through trait objects. `down` is `None` for irreversible changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub up: &'static str,
    pub down: Option<&'static str>,
}

impl Migration {
    pub const fn new(version: i64, name: &'static str, up: &'static str) -> Self {
        Self {
            version,
            name,
            up,
            down: None,
        }
    }

    pub const fn reversible(mut self, down: &'static str) -> Self {
        self.down = Some(down);
        self
    }

    pub fn is_reversible(&self) -> bool {
        self.down.is_some()
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}_{}", self.version, self.name)
    }
}

/// A row of the migration-history table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

/// Lifecycle of a migration during a runner pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Pending,
    Applying,
    Applied,
    Failed,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Applying => "applying",
            Self::Applied => "applied",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Status line for one registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub migration: Migration,
    pub state: MigrationState,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Outcome of a single runner pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Versions applied during this pass, in order.
    pub applied: Vec<i64>,
    /// Versions that were already recorded before the pass.
    pub skipped: Vec<i64>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Outcome of an explicit rollback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackOutcome {
    RolledBack { version: i64 },
    NotApplied { version: i64 },
}

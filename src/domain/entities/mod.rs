//! Core domain entities.
//!
//! - [`LinkRecord`] - A stored short link and its hit counter
//! - [`ShortLink`] / [`LinkAnalytics`] - Service-level views of a link
//! - [`Migration`] - A versioned schema change from the registry
//! - [`AppliedMigration`] - A row of the migration history

pub mod link;
pub mod migration;

pub use link::{LinkAnalytics, LinkRecord, ShortLink};
pub use migration::{
    AppliedMigration, Migration, MigrationReport, MigrationState, MigrationStatus,
    RollbackOutcome,
};

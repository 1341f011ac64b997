//! Application layer services implementing business logic.
//!
//! Services consume repository traits and expose the operations the HTTP
//! layer and the CLI call.
//!
//! - [`services::link_service::LinkService`] - Shorten, resolve-and-count, analytics
//! - [`services::migration_runner::MigrationRunner`] - Ordered schema migrations

pub mod services;

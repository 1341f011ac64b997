//! Business logic services for the application layer.

pub mod link_service;
pub mod migration_runner;

pub use link_service::LinkService;
pub use migration_runner::MigrationRunner;

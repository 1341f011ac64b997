//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! - [`LinkRepository`] - Short link storage and atomic hit counting
//! - [`MigrationRepository`] - Migration history and step execution

pub mod link_repository;
pub mod migration_repository;

pub use link_repository::LinkRepository;
pub use migration_repository::MigrationRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use migration_repository::MockMigrationRepository;

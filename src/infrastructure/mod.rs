//! Infrastructure layer for external integrations.
//!
//! Implements the repository traits defined by the domain layer.
//!
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`migrations`] - The ordered schema migration registry

pub mod migrations;
pub mod persistence;

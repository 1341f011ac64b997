//! Domain layer containing business entities and repository contracts.
//!
//! - [`entities`] - Core data structures (links, migrations)
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on the HTTP layer. Business logic lives
//! in [`crate::application::services`].

pub mod entities;
pub mod repositories;

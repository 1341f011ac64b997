//! Link and migration-history storage.
//!
//! - [`PgLinkRepository`] - PostgreSQL link storage with atomic counters
//! - [`MemoryLinkRepository`] - In-process link storage for local runs and tests
//! - [`PgMigrationRepository`] - Migration history in `schema_migrations`
//! - [`pool`] - Bounded connection pool construction

pub mod memory_link_repository;
pub mod pg_link_repository;
pub mod pg_migration_repository;
pub mod pool;

pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_migration_repository::PgMigrationRepository;
pub use pool::PoolSettings;

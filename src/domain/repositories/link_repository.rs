//! Repository trait for short link data access.

use crate::domain::entities::LinkRecord;
use crate::error::AppError;
use async_trait::async_trait;

/// Durable mapping of short codes to original URLs and hit counters.
///
/// Every method is a single store round-trip. Implementations must never
/// perform read-modify-write on the counter from the application side.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with a zero hit count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateCode`] if `short_code` is already taken.
    /// Nothing is written in that case.
    async fn insert(&self, short_code: &str, original_url: &str) -> Result<LinkRecord, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    async fn find_by_code(&self, short_code: &str) -> Result<LinkRecord, AppError>;

    /// Finds an existing link for exactly this original URL.
    ///
    /// Used to return the same code when a URL is shortened twice.
    async fn find_by_url(&self, original_url: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Atomically increments the hit counter and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    async fn increment_hit(&self, short_code: &str) -> Result<i64, AppError>;

    /// Atomically increments the hit counter and returns the updated record.
    ///
    /// Lookup and increment happen in one store operation, so there is no
    /// window between reading the URL and counting the hit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    async fn resolve_and_increment(&self, short_code: &str) -> Result<LinkRecord, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}

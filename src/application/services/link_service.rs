//! Link creation, resolution and analytics service.

use std::sync::Arc;

use crate::domain::entities::{LinkAnalytics, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;
use crate::utils::url_validator::validate_url;

/// Orchestrates the code generator and the link store.
///
/// The service holds no locks of its own. Concurrent shortens race only on
/// the store's unique constraint; concurrent resolves of the same code are
/// serialized by the store's atomic increment.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    generator: CodeGenerator,
    base_url: String,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    ///
    /// `base_url` is the public prefix of short URLs, e.g. `https://s.example.com`.
    pub fn new(link_repository: Arc<L>, generator: CodeGenerator, base_url: String) -> Self {
        Self {
            link_repository,
            generator,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a short link for `url`.
    ///
    /// # Deduplication
    ///
    /// If this exact URL was shortened before, the existing code is returned
    /// and nothing is written.
    ///
    /// # Code Generation
    ///
    /// Each attempt draws a fresh candidate and tries to insert it. The insert
    /// is the uniqueness check: on [`AppError::DuplicateCode`] the loop draws
    /// again, up to the generator's attempt cap. Any other store error is
    /// returned as-is and never retried here, because the insert may already
    /// have committed.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if the URL is malformed, not http/https, or disallowed
    /// - [`AppError::GenerationExhausted`] if every attempt collided
    /// - [`AppError::Unavailable`] on transient store failures
    pub async fn shorten(&self, url: &str) -> Result<ShortLink, AppError> {
        let original_url = validate_url(url).map_err(|e| AppError::invalid_url(e.to_string()))?;

        if let Some(existing) = self.link_repository.find_by_url(original_url).await? {
            tracing::debug!(code = %existing.short_code, "URL already shortened");
            return Ok(self.to_short_link(
                existing.short_code,
                existing.original_url,
                existing.created_at,
            ));
        }

        let max_attempts = self.generator.max_attempts();
        for attempt in 1..=max_attempts {
            let candidate = self.generator.generate(original_url);

            match self.link_repository.insert(&candidate, original_url).await {
                Ok(record) => {
                    tracing::info!(code = %record.short_code, attempt, "Short link created");
                    metrics::counter!("links_created_total").increment(1);
                    return Ok(self.to_short_link(
                        record.short_code,
                        record.original_url,
                        record.created_at,
                    ));
                }
                Err(AppError::DuplicateCode { code }) => {
                    tracing::warn!(%code, attempt, max_attempts, "Short code collision, retrying");
                    metrics::counter!("code_collisions_total").increment(1);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(max_attempts, "Exhausted short code generation attempts");
        Err(AppError::GenerationExhausted {
            attempts: max_attempts,
        })
    }

    /// Resolves a short code to its original URL and counts the hit.
    ///
    /// Lookup and increment are a single store operation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist; no record
    /// is altered in that case.
    pub async fn resolve_and_count(&self, short_code: &str) -> Result<String, AppError> {
        let record = self.link_repository.resolve_and_increment(short_code).await?;

        tracing::debug!(code = %record.short_code, hits = record.hit_count, "Resolved short link");
        metrics::counter!("redirects_total").increment(1);

        Ok(record.original_url)
    }

    /// Returns stored metadata and the current hit count for a code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist.
    pub async fn get_analytics(&self, short_code: &str) -> Result<LinkAnalytics, AppError> {
        let record = self.link_repository.find_by_code(short_code).await?;
        Ok(record.into())
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url, short_code)
    }

    /// Checks that the underlying store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }

    fn to_short_link(
        &self,
        short_code: String,
        original_url: String,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> ShortLink {
        ShortLink {
            short_url: self.short_url(&short_code),
            short_code,
            original_url,
            created_at,
        }
    }
}

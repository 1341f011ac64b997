//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortLink;

/// Request to shorten a single URL.
///
/// Only shape is checked here; scheme, host and loopback rules are enforced
/// by the service so that every entry point shares them.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (http/https, at most 2048 bytes).
    #[validate(length(min = 1, max = 2048, message = "URL must be 1 to 2048 bytes long"))]
    pub url: String,
}

/// Created (or previously created) short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<ShortLink> for ShortenResponse {
    fn from(link: ShortLink) -> Self {
        Self {
            short_code: link.short_code,
            original_url: link.original_url,
            short_url: link.short_url,
            created_at: link.created_at,
        }
    }
}

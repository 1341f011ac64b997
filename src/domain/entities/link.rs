//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored short link with its redirect counter.
///
/// `short_code` and `original_url` never change after insertion. `hit_count`
/// only moves through the store's atomic increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LinkRecord {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "transition_count")]
    pub hit_count: i64,
}

impl LinkRecord {
    /// Creates a freshly inserted record with a zero counter.
    pub fn new(short_code: String, original_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            short_code,
            original_url,
            created_at,
            hit_count: 0,
        }
    }
}

/// Result of a successful shorten call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only view of a link used by the analytics query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAnalytics {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub hit_count: i64,
}

impl From<LinkRecord> for LinkAnalytics {
    fn from(record: LinkRecord) -> Self {
        Self {
            short_code: record.short_code,
            original_url: record.original_url,
            created_at: record.created_at,
            hit_count: record.hit_count,
        }
    }
}

//! DTOs for link analytics endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::LinkAnalytics;

/// Stored metadata and hit count for one short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub created_at: DateTime<Utc>,
    pub hit_count: i64,
}

impl AnalyticsResponse {
    pub fn new(analytics: LinkAnalytics, short_url: String) -> Self {
        Self {
            short_code: analytics.short_code,
            original_url: analytics.original_url,
            short_url,
            created_at: analytics.created_at,
            hit_count: analytics.hit_count,
        }
    }
}

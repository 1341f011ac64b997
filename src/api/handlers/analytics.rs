//! Handler for per-link analytics.

use axum::{
    Json,
    extract::{Path, State},
};

use super::retry::with_retry;
use crate::api::dto::analytics::AnalyticsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns stored metadata and the hit count for a short code.
///
/// # Endpoint
///
/// `GET /api/analytics/{code}`
///
/// Reading analytics never counts as a hit.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn analytics_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let analytics = with_retry("analytics", || state.link_service.get_analytics(&code)).await?;
    let short_url = state.link_service.short_url(&analytics.short_code);

    Ok(Json(AnalyticsResponse::new(analytics, short_url)))
}

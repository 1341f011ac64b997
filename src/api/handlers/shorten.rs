//! Handler for link shortening endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use validator::Validate;

use super::retry::with_retry;
use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/a/b?c=1" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "short_code": "aZ3kQ2x",
///   "original_url": "https://example.com/a/b?c=1",
///   "short_url": "https://s.example.com/aZ3kQ2x",
///   "created_at": "2024-01-01T00:00:00Z"
/// }
/// ```
///
/// Shortening a URL that already has a code returns the existing link.
/// Transient store failures are retried; repeating the call is safe because
/// a committed insert is found again by URL.
///
/// # Errors
///
/// - 400 Bad Request if the body is malformed or the URL is rejected
/// - 500 Internal Server Error if no free code was found
/// - 503 Service Unavailable if the store stays unreachable
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let link = with_retry("shorten", || state.link_service.shorten(&payload.url)).await?;

    Ok(Json(link.into()))
}

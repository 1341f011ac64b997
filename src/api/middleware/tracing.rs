//! HTTP request/response tracing middleware.

use axum::body::Body;
use axum::extract::Request;
use axum::http::Response;
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::Span;

type MakeSpan = fn(&Request) -> Span;
type OnResponse = fn(&Response<Body>, Duration, &Span);

/// Creates a tracing middleware for HTTP requests.
///
/// Each request gets an `http_request` span carrying the method and path.
/// Responses are logged inside that span with their status and latency;
/// 5xx responses are logged at `WARN` so store outages stand out.
///
/// # Example Logs
///
/// ```text
/// INFO http_request{method=POST path=/api/shorten}: response status=200 latency_ms=12
/// INFO http_request{method=GET path=/aZ3kQ2x}: response status=307 latency_ms=1
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeSpan, (), OnResponse> {
    TraceLayer::new_for_http()
        .make_span_with(make_span as MakeSpan)
        .on_request(())
        .on_response(on_response as OnResponse)
}

fn make_span(request: &Request) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

fn on_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    let status = response.status().as_u16();
    let latency_ms = latency.as_millis() as u64;

    if response.status().is_server_error() {
        tracing::warn!(status, latency_ms, "response");
    } else {
        tracing::info!(status, latency_ms, "response");
    }
}

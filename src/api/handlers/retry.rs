//! Bounded retry of idempotent service calls.

use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::error::AppError;

/// Total attempts, including the first one.
pub(crate) const MAX_ATTEMPTS: usize = 3;

/// Runs `action`, retrying [`AppError::Unavailable`] with jittered
/// exponential backoff (about 50ms, then 100ms).
///
/// Only wrap operations that are safe to repeat. Resolve counts a hit on
/// every call and must not go through here.
pub(crate) async fn with_retry<T, F, Fut>(operation: &'static str, action: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(25)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_ATTEMPTS - 1);

    RetryIf::start(strategy, action, |e: &AppError| {
        let retryable = e.is_retryable();
        if retryable {
            tracing::warn!(operation, error = %e, "Transient failure, retrying");
        }
        retryable
    })
    .await
}

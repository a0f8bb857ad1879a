//! Retry with exponential back-off and jitter for the FieldOps clients.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx). Session, version and payload
//! errors are returned immediately.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ApiError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx.
///
/// **Not retriable:** session/version errors, deserialization errors, 4xx,
/// and configuration errors. Retrying would produce the same answer.
pub(crate) fn is_retriable(err: &ApiError) -> bool {
    match err {
        ApiError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ApiError::UnexpectedStatus { status, .. } => *status >= 500,
        ApiError::Deserialize { .. }
        | ApiError::SessionRevoked
        | ApiError::SessionExpired
        | ApiError::AppUpdateRequired { .. }
        | ApiError::InvalidBaseUrl { .. } => false,
    }
}

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Sleep before retry number `attempt` (1-based): `base × 2^(attempt-1)`
/// scaled by `jitter`, never longer than [`MAX_BACKOFF`].
fn backoff_delay(base: Duration, attempt: u32, jitter: f64) -> Duration {
    let exponent = attempt.saturating_sub(1).min(10);
    base.saturating_mul(1 << exponent)
        .min(MAX_BACKOFF)
        .mul_f64(jitter)
        .min(MAX_BACKOFF)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors, sleeping [`backoff_delay`] with ±25 % jitter between attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let base = Duration::from_millis(backoff_base_ms);
    let mut attempt = 0;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if attempt == max_retries || !is_retriable(&err) {
            return Err(err);
        }
        attempt += 1;
        let delay = backoff_delay(base, attempt, rand::rng().random_range(0.75..=1.25));
        tracing::warn!(
            attempt,
            max_retries,
            ?delay,
            error = %err,
            "transient FieldOps API error, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

//! Retry logic with exponential backoff
//!
//! Outbound API calls are retried on transient failures with a deterministic
//! exponential backoff schedule: the sleep before retry `n` (1-based) is
//! `base_delay * 2^(n-1)`, capped at `max_delay`. Optional jitter exists for
//! deployments that need it but is off by default.
//!
//! Exhausting all attempts does not produce an error — it produces `None`.
//! Callers treat "no response" as the single uniform failure case, which is
//! what lets page- and candidate-level failures stay non-fatal everywhere
//! above this layer.

use crate::config::RetryConfig;
use rand::Rng;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;

/// HTTP statuses indicating rate-limiting or transient server failure
const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (connection errors, timeouts, server busy) should
/// return `true`. Permanent failures (authorization rejected, resource gone)
/// should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

/// Failure of a single fetch attempt
#[derive(Debug)]
pub enum FetchError {
    /// The transport failed before a response arrived (connection, timeout)
    Transport(reqwest::Error),

    /// The server responded with a non-success status
    Status(StatusCode),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "transport error: {e}"),
            FetchError::Status(status) => write!(f, "status code {status} received"),
        }
    }
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status(status) => RETRYABLE_STATUSES.contains(status),
        }
    }
}

/// Execute an async operation with bounded retries and exponential backoff.
///
/// Attempts the operation up to `config.max_attempts` times. A retryable
/// error sleeps the backoff delay and tries again; a non-retryable error
/// gives up immediately. Both exhaustion and terminal failure yield `None` —
/// the uniform "no response" signal.
pub async fn fetch_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "call succeeded after retry");
                }
                return Some(result);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = backoff_delay(config, attempt);
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts,
                    delay_secs = delay.as_secs(),
                    "attempt failed, waiting before retrying"
                );

                let delay = if config.jitter { add_jitter(delay) } else { delay };
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        max_attempts,
                        "max retries reached, giving up"
                    );
                } else {
                    tracing::error!(error = %e, "call failed with non-retryable error");
                }
                return None;
            }
        }
    }

    None
}

/// Backoff delay after the given failed attempt (1-based): doubles each
/// retry starting from `base_delay`, capped at `max_delay`.
fn backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    config
        .base_delay
        .saturating_mul(factor)
        .min(config.max_delay)
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay, so the
/// actual delay lands between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}

//! Exponential backoff for transient provider failures.
//!
//! Rate limits, timeouts, and 5xx responses get retried; authentication,
//! quota, and validation failures surface immediately.

use std::future::Future;
use std::time::Duration;

use backoff::{future::retry, Error as BackoffError, ExponentialBackoff};
use tracing::warn;

/// Backoff tuning for retried provider calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// First wait between attempts, in milliseconds
    pub initial_interval_ms: u64,

    /// Give up once this much time has elapsed, in milliseconds
    pub max_elapsed_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            max_elapsed_ms: 15_000,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            max_elapsed_time: Some(Duration::from_millis(self.max_elapsed_ms)),
            ..Default::default()
        }
    }
}

/// Run `operation` with exponential backoff, retrying errors that
/// `is_transient` accepts until the policy's elapsed time limit is hit.
pub async fn with_retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_transient: P,
    mut operation: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let is_transient = &is_transient;
    retry(policy.backoff(), || {
        let fut = operation();
        async move {
            fut.await.map_err(|e| {
                if is_transient(&e) {
                    warn!(error = %e, "transient provider failure, retrying");
                    BackoffError::transient(e)
                } else {
                    BackoffError::permanent(e)
                }
            })
        }
    })
    .await
}

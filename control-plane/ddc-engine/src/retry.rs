//! Optimistic-concurrency retry.
//!
//! A write that loses a resourceVersion race is retried from a fresh read;
//! any other error ends the loop immediately. The operation passed in must
//! therefore re-fetch the object on every attempt.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::EngineError;

#[derive(Clone, Debug)]
pub struct ConflictRetry {
    /// Maximum number of attempts (0 = until success)
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for ConflictRetry {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 5.0,
        }
    }
}

impl ConflictRetry {
    pub fn with_max_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts,
            ..Default::default()
        }
    }
}

/// Run `operation` until it returns something other than
/// [`EngineError::Conflict`], sleeping with jittered exponential backoff in
/// between. Cancellation during a backoff sleep yields
/// [`EngineError::Cancelled`].
pub async fn retry_on_conflict<F, Fut, T>(
    policy: &ConflictRetry,
    cancel: &CancellationToken,
    operation_name: &str,
    mut operation: F,
) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let mut attempt = 0u32;
    let mut delay = policy.initial_delay;

    loop {
        attempt += 1;
        match operation().await {
            Err(e) if e.is_conflict() => {
                if policy.max_attempts > 0 && attempt >= policy.max_attempts {
                    warn!(
                        operation = %operation_name,
                        attempt,
                        error = %e,
                        "conflict retries exhausted"
                    );
                    return Err(e);
                }

                // 0.9x to 1.1x of the delay
                let jitter = rand::rng().random_range(0.9..1.1);
                let jittered = Duration::from_secs_f64(delay.as_secs_f64() * jitter);
                debug!(
                    operation = %operation_name,
                    attempt,
                    delay_ms = jittered.as_millis() as u64,
                    "version conflict, retrying with a fresh read"
                );

                tokio::select! {
                    _ = cancel.cancelled() => return Err(EngineError::Cancelled),
                    _ = tokio::time::sleep(jittered) => {}
                }

                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * policy.backoff_multiplier)
                        .min(policy.max_delay.as_secs_f64()),
                );
            }
            other => return other,
        }
    }
}

// =============================================================================
// Retry with Exponential Backoff
// =============================================================================
//
// Exchange endpoints rate-limit and occasionally drop requests.  Fetches are
// retried a bounded number of times, sleeping between attempts and growing
// the delay geometrically:
//
//   attempt 1 -> fail -> sleep 1s -> attempt 2 -> fail -> sleep 2s -> attempt 3
//
// The last error is returned once attempts are exhausted.
// =============================================================================

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

/// Bounded exponential backoff settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.  Zero is treated as one.
    pub max_attempts: u32,
    /// Sleep before the second attempt.
    pub initial_delay: Duration,
    /// Factor applied to the delay after every failed attempt.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is reached.
///
/// `label` names the operation in logs and in the final error context.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                return Err(e.context(format!("{label} failed after {max_attempts} attempts")));
            }
            Err(e) => {
                warn!(
                    operation = label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(policy.multiplier.max(1.0));
                attempt += 1;
            }
        }
    }
}

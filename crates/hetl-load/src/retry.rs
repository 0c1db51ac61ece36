//! Bounded exponential backoff for transient sink failures.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::sink::SinkError;

/// Retry bounds for one load operation. Retries are serialized within a
/// dataset; only transient failures are retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per subsequent retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following the given 1-based attempt.
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Run an operation, retrying transient failures with exponential backoff.
///
/// Returns the last error once attempts are exhausted or immediately on a
/// permanent failure.
pub fn with_retries<T>(
    policy: RetryPolicy,
    mut operation: impl FnMut() -> Result<T, SinkError>,
) -> Result<T, SinkError> {
    let mut attempt = 1u32;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(attempt, delay_ms = delay.as_millis() as u64, %error, "transient sink failure, retrying");
                thread::sleep(delay);
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

//! Bounded retry for transient storage failures.

use std::{future::Future, time::Duration};

use super::{RepositoryError, Result};

/// Linear backoff policy: retry `n` sleeps `base_delay * n` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three retries after 0.5s, 1.0s and 1.5s.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before the given retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }

    /// Total attempts including the initial one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Runs `op` until it succeeds, fails permanently, or retries run out.
///
/// Only transient errors (see [`RepositoryError::is_transient`]) are retried.
/// Exhausting the policy yields [`RepositoryError::ServiceUnavailable`]
/// carrying the last underlying error. `op` receives the 1-based attempt.
pub async fn retry_transient<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => e,
            Err(e) => return Err(e),
        };

        if attempt >= policy.max_attempts() {
            tracing::error!(attempts = attempt, error = %err, "Storage unavailable, giving up");
            return Err(RepositoryError::ServiceUnavailable {
                attempts: attempt,
                last_error: err.to_string(),
            });
        }

        let delay = policy.delay_for(attempt);
        tracing::warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Transient storage failure, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

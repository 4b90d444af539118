//! Bounded retry with linear backoff.
//!
//! Token refresh is the only operation that retries: the endpoint is
//! rate-limited by the vault and refresh happens on an hourly scale, so
//! a plain blocking delay between attempts is acceptable. All other
//! failures propagate immediately.

use crate::error::BeyondTrustResult;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay; attempt `n` waits `backoff_base * n` before the next
    pub backoff_base: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Set the total attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the base backoff delay.
    #[must_use]
    pub const fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }
}

/// Retry policy for executing operations with bounded retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration.
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Calculate the delay applied after the given attempt (1-based) fails.
    #[must_use]
    pub const fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.config.backoff_base.saturating_mul(attempt)
    }

    /// Get the total attempt budget.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Execute an async operation, retrying transient failures.
    ///
    /// Non-retryable errors short-circuit. After the budget is spent the
    /// last error is returned unwrapped; the caller decides how to label
    /// exhaustion.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> BeyondTrustResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = BeyondTrustResult<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient failure, retry scheduled"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

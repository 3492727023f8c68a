//! Retry mechanism with exponential backoff

use super::types::{Cancelled, RetryConfig, Retryable};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Retry mechanism with exponential backoff
///
/// Knows only "try, wait, try again": breaker and limiter integration lives
/// in the resilient client.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create a new retry executor
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Backoff after the failed attempt with 0-based index `attempt`:
    /// `base_delay * 2^attempt`, capped at `max_delay`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.config
            .base_delay
            .checked_mul(factor)
            .unwrap_or(self.config.max_delay)
            .min(self.config.max_delay)
    }

    /// Delay before the next attempt, honouring a server-provided hint
    ///
    /// The hint never shortens the computed backoff, and the cap still applies.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.backoff_delay(attempt);
        match retry_after {
            Some(hint) => backoff.max(hint).min(self.config.max_delay),
            None => backoff,
        }
    }

    /// Execute an operation with retry logic
    ///
    /// Returns the first success, the first non-retryable error, or the last
    /// error once `max_attempts` is exhausted. Cancellation during a backoff
    /// wait returns immediately with the cancellation error.
    pub async fn execute<F, Fut, R, E>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
    ) -> std::result::Result<R, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
        E: Retryable + From<Cancelled> + Display,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!("Retry succeeded on attempt {}", attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        debug!("Attempt {} failed with non-retryable error: {}", attempt, error);
                        return Err(error);
                    }

                    if attempt >= max_attempts {
                        warn!("Giving up after {} attempts: {}", attempt, error);
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt - 1, error.retry_after());
                    warn!(
                        "Attempt {}/{} failed: {}, retrying in {:?}",
                        attempt, max_attempts, error, delay
                    );

                    tokio::select! {
                        _ = cancel.cancelled() => {
                            return Err(E::from(Cancelled::new("retry backoff")));
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

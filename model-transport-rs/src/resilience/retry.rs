//! Retry with exponential backoff for recoverable transport errors
//!
//! Retries never outlive the caller's deadline: a backoff that would end
//! past the deadline is not taken and the last error is returned instead.

use std::future::Future;
use std::time::Duration;

use backoff::{backoff::Backoff, ExponentialBackoff};
use tokio::time::Instant;

use crate::error::Result;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 means no retries)
    pub max_retries: u32,

    /// Initial backoff duration
    pub initial_interval: Duration,

    /// Maximum backoff duration
    pub max_interval: Duration,

    /// Multiplier for backoff between retries
    pub multiplier: f64,

    /// Randomization applied to each interval
    pub randomization_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_secs(2),
            multiplier: 2.0,
            randomization_factor: 0.2,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Executor for retry operations with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails permanently, runs out of
    /// attempts, or the next backoff would cross `deadline`.
    pub async fn execute<F, Fut, T>(&self, deadline: Instant, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.config.initial_interval,
            max_interval: self.config.max_interval,
            multiplier: self.config.multiplier,
            randomization_factor: self.config.randomization_factor,
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        };
        backoff.reset();

        let mut attempts = 0;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || attempts >= self.config.max_retries {
                return Err(err);
            }

            let wait = match backoff.next_backoff() {
                Some(wait) => wait,
                None => return Err(err),
            };
            if Instant::now() + wait >= deadline {
                tracing::debug!(error = %err, "No time left for another attempt");
                return Err(err);
            }

            attempts += 1;
            tracing::warn!(
                "Request failed with retryable error, retrying in {:?} (attempt {}/{}): {}",
                wait,
                attempts,
                self.config.max_retries,
                err
            );
            tokio::time::sleep(wait).await;
        }
    }
}

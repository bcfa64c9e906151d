//! Exponential backoff for ranking requests

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// How many times a failed request is attempted again, and how long to wait first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error, or
    /// the retry budget is spent. The delay doubles after every failure.
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.base_delay;
        let mut attempts = 0;

        loop {
            attempts += 1;

            match operation().await {
                Ok(value) => {
                    if attempts > 1 {
                        info!("{} succeeded after {} attempts", label, attempts);
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_retryable() => {
                    debug!("{} failed with a non-retryable error: {}", label, e);
                    return Err(e);
                }
                Err(e) if attempts >= self.max_attempts() => {
                    warn!("{} failed after {} attempts, giving up: {}", label, attempts, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "{} attempt {}/{} failed, retrying in {:?}: {}",
                        label,
                        attempts,
                        self.max_attempts(),
                        delay,
                        e
                    );
                    sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
            }
        }
    }
}

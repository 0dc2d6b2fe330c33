use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::RpcError;

/// Bounded exponential backoff with jitter.
///
/// Only errors for which [`RpcError::is_retryable`] holds are retried; the
/// last error is returned once `max_attempts` is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based): the capped exponential
    /// step, jittered uniformly into its upper half.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        let step = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let floor = step / 2;
        let spread = step.saturating_sub(floor);
        if spread.is_zero() {
            return step;
        }
        let jitter = rand::thread_rng().gen_range(0..=spread.as_micros() as u64);
        floor + Duration::from_micros(jitter)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or runs out of attempts.
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T, RpcError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{label} failed (attempt {attempt}/{attempts}): {e}. Retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

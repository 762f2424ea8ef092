//! Retry logic with exponential backoff

use std::time::Duration;
use anyhow::Result;
use tracing::warn;
use crate::errors::{AnalyzerError, AnalyzerResult};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential_base: f64,
    /// Fraction of the delay randomly added or removed, 0.0 disables jitter.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
            exponential_base: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after failed attempt number `attempt` (1-based),
    /// before jitter.
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.initial_delay_ms as f64 * self.exponential_base.powi(exponent);
        (delay as u64).min(self.max_delay_ms)
    }

    fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms(attempt);
        let offset = base as f64 * self.jitter * (rand::random::<f64>() - 0.5);
        let millis = (base as f64 + offset).max(0.0) as u64;
        Duration::from_millis(millis.min(self.max_delay_ms))
    }
}

/// Runs `operation` until it succeeds or `policy.max_attempts` is spent.
/// Errors that should not be retried are returned as `Ok(Err(..))` by the
/// operation's caller instead.
pub async fn retry_with_backoff<F, Fut, T>(
    operation: F,
    policy: &RetryPolicy,
    context: &str,
) -> AnalyzerResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= policy.max_attempts => {
                return Err(AnalyzerError::Network {
                    message: format!("{} failed after {} attempts", context, attempt),
                    source: Some(e),
                    retry_count: attempt,
                });
            }
            Err(e) => {
                let delay = policy.delay_with_jitter(attempt);
                warn!(
                    "Attempt {}/{} failed for {}: {}. Retrying in {}ms...",
                    attempt,
                    policy.max_attempts,
                    context,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

//! Retry with exponential backoff for upstream chat calls

use super::ChatError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, initial_delay_ms: 1000, max_delay_ms: 30_000 }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// Delay before retry number `attempt` (1-based), doubling and capped
    pub fn delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as u32;
        let millis = self.initial_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(millis.min(self.max_delay_ms))
    }

    /// Run `operation` until it succeeds, fails permanently or runs out of retries
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ChatError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ChatError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = e.retry_after().unwrap_or_else(|| self.delay(attempt));
                    warn!("{} failed ({}), retry {} in {:?}", label, e, attempt, delay);
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

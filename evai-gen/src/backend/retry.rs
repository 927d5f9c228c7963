//! Retry with exponential backoff for transient backend errors
//!
//! Only [`ErrorKind::Timeout`](crate::error::ErrorKind::Timeout) and
//! [`ErrorKind::RateLimited`](crate::error::ErrorKind::RateLimited) are
//! retried. Every other kind fails immediately. When attempts run out the
//! last error is returned unchanged, so callers see its original kind.

use crate::error::BackendError;
use evai_common::config::RetryConfig;
use std::future::Future;
use std::time::{Duration, Instant};

/// Backoff schedule for one client
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            multiplier: config.multiplier,
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based), capped at `max_backoff`
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.powi(retry.saturating_sub(1) as i32);
        let millis = (self.initial_backoff.as_millis() as f64 * factor)
            .min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out
pub async fn retry_transient<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, BackendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let start_time = Instant::now();
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        if attempt > 1 {
            tracing::debug!(
                operation = operation_name,
                attempt,
                "Retrying backend call"
            );
        }

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Backend call succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_transient() {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        kind = %err.kind,
                        "Backend call failed permanently"
                    );
                    return Err(err);
                }

                if attempt >= policy.max_attempts {
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        kind = %err.kind,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Backend call failed: retries exhausted"
                    );
                    return Err(err);
                }

                let backoff = policy.backoff_for(attempt);
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    kind = %err.kind,
                    backoff_ms = backoff.as_millis() as u64,
                    "Transient backend error, will retry after backoff"
                );

                tokio::time::sleep(backoff).await;
            }
        }
    }
}

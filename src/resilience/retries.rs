//! Retry with exponential backoff.
//!
//! # Responsibilities
//! - Re-run a failed operation up to a fixed number of attempts
//! - Wait d, 2d, 4d, ... between attempts
//! - Propagate the last failure unchanged once attempts are exhausted

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;

/// Run `op` up to `max_attempts` times (at least once).
///
/// Attempts are strictly sequential; nothing is retried concurrently.
pub async fn retry<T, E, F, Fut>(mut op: F, max_attempts: u32, initial_delay: Duration) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut schedule = Backoff::new(initial_delay);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                if max_attempts > 1 {
                    tracing::warn!(attempts = attempt, error = %e, "Retries exhausted");
                }
                return Err(e);
            }
            Err(e) => {
                let backoff = schedule.next().unwrap_or(initial_delay);
                tracing::info!(attempt, delay = ?backoff, error = %e, "Retrying operation");
                metrics::record_retry();
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

/// [`retry`] driven by a [`RetryConfig`].
pub async fn retry_with<T, E, F, Fut>(config: &RetryConfig, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry(op, config.max_attempts, Duration::from_millis(config.initial_delay_ms)).await
}

//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap transport calls with a deadline
//! - Surface an expired deadline as a `Network` error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeouts are the only involuntary termination; there is no cancellation token

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Await `fut`, failing with `Error::Network` if it runs past `duration`.
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = duration.as_millis() as u64, "Request timed out");
            Err(Error::network(format!(
                "request timed out after {} ms",
                duration.as_millis()
            )))
        }
    }
}

/// Suspend for `ms` milliseconds.
pub async fn delay(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

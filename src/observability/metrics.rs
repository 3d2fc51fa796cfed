//! Metrics collection.
//!
//! # Metrics
//! - `client_requests_total` (counter): dispatches by method, status
//! - `client_request_duration_seconds` (histogram): dispatch latency by method
//! - `client_uploads_total` (counter): uploads by provider, outcome
//! - `client_retries_total` (counter): retry attempts scheduled
//! - `client_errors_total` (counter): reported errors by kind

use metrics::{counter, histogram};
use std::time::Instant;

use crate::error::ErrorKind;

/// Record a completed dispatch. `status` is 0 when no response arrived.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "client_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("client_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upload(provider: &'static str, outcome: &'static str) {
    counter!("client_uploads_total", "provider" => provider, "outcome" => outcome).increment(1);
}

pub fn record_retry() {
    counter!("client_retries_total").increment(1);
}

pub fn record_error(kind: ErrorKind) {
    counter!("client_errors_total", "kind" => kind.to_string()).increment(1);
}

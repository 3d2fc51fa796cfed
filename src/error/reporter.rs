//! Error reporting: user notification plus a bounded, persisted error log.
//!
//! # Responsibilities
//! - Render the user-facing message for a handled error
//! - Optionally surface a transient notification
//! - Append every handled error to the log (newest first, capacity 100)
//! - Expose the log for diagnostics

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{user_message, Error, ErrorKind};
use crate::observability::metrics;
use crate::resilience::clock::{Clock, SystemClock};
use crate::storage::{self, KeyValueStore};

/// Storage key of the persisted error log.
pub const ERROR_LOG_KEY: &str = "error_logs";
/// Maximum number of records kept.
pub const ERROR_LOG_CAPACITY: usize = 100;

/// One handled error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub code: i64,
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Where the error was handled (screen, operation, ...).
    pub context: Option<String>,
}

/// Surface for transient user notifications (toasts).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, duration: Duration);
}

/// Notifier that only emits a log event. Used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, duration: Duration) {
        tracing::info!(duration_ms = duration.as_millis() as u64, "{}", message);
    }
}

/// Per-call reporting options.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Show a notification with the rendered message.
    pub notify: bool,
    /// How long the notification stays visible.
    pub duration: Duration,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            notify: true,
            duration: Duration::from_millis(2000),
        }
    }
}

impl ReportOptions {
    pub fn silent() -> Self {
        Self {
            notify: false,
            ..Self::default()
        }
    }
}

/// Renders, notifies and records handled errors.
pub struct ErrorReporter {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    log: Mutex<VecDeque<ErrorRecord>>,
}

impl ErrorReporter {
    /// Create a reporter, loading any log already persisted in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_clock(store, notifier, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut log: VecDeque<ErrorRecord> =
            storage::get_typed::<Vec<ErrorRecord>>(store.as_ref(), ERROR_LOG_KEY)
                .unwrap_or_default()
                .into();
        log.truncate(ERROR_LOG_CAPACITY);

        Self {
            store,
            notifier,
            clock,
            log: Mutex::new(log),
        }
    }

    /// Handle an error returned by the transport or the upload pipeline.
    pub fn handle(&self, error: &Error, context: Option<&str>, options: ReportOptions) -> ErrorRecord {
        let message = user_message(error);
        let record = ErrorRecord {
            kind: error.kind(),
            code: error.code(),
            message,
            timestamp: self.clock.now_millis(),
            context: context.map(str::to_string),
        };

        tracing::warn!(
            kind = %record.kind,
            code = record.code,
            context = ?record.context,
            detail = %error,
            "{}",
            record.message
        );

        self.surface(&record, options);
        record
    }

    /// Handle a failure detected by the caller rather than the transport.
    pub fn handle_business(
        &self,
        message: &str,
        context: Option<&str>,
        options: ReportOptions,
    ) -> ErrorRecord {
        let record = ErrorRecord {
            kind: ErrorKind::Business,
            code: 0,
            message: message.to_string(),
            timestamp: self.clock.now_millis(),
            context: context.map(str::to_string),
        };
        tracing::warn!(kind = %record.kind, context = ?record.context, "{}", record.message);

        self.surface(&record, options);
        record
    }

    /// Snapshot of the log, newest first.
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.lock_log().iter().cloned().collect()
    }

    /// Drop every record, in memory and in storage.
    pub fn clear(&self) {
        let mut log = self.lock_log();
        log.clear();
        if let Err(e) = self.store.remove(ERROR_LOG_KEY) {
            tracing::error!(error = %e, "Failed to clear error log");
        }
    }

    fn surface(&self, record: &ErrorRecord, options: ReportOptions) {
        if options.notify {
            self.notifier.notify(&record.message, options.duration);
        }
        metrics::record_error(record.kind);
        self.append(record.clone());
    }

    fn append(&self, record: ErrorRecord) {
        // Persist under the lock so stored snapshots land in append order.
        let mut log = self.lock_log();
        log.push_front(record);
        log.truncate(ERROR_LOG_CAPACITY);
        let snapshot: Vec<&ErrorRecord> = log.iter().collect();

        // A failed write only loses diagnostics; the in-memory log stays intact.
        if let Err(e) = storage::set_typed(self.store.as_ref(), ERROR_LOG_KEY, &snapshot) {
            tracing::error!(error = %e, "Failed to persist error log");
        }
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, VecDeque<ErrorRecord>> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("records", &self.lock_log().len())
            .finish()
    }
}

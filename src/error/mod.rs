//! Error taxonomy.
//!
//! # Data Flow
//! ```text
//! adapter failure / envelope / validation
//!     → Error (one of the closed set of kinds)
//!     → caller
//!     → reporter.rs (user message, notification, bounded log)
//! ```
//!
//! # Design Decisions
//! - Every failure is normalized into `Error` before it reaches a caller
//! - Codes follow the wire: business code, HTTP status, or a negative
//!   sentinel for client-side failures

pub mod messages;
pub mod reporter;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use messages::user_message;
pub use reporter::{ErrorRecord, ErrorReporter, Notifier, ReportOptions, TracingNotifier};

/// Code used for failures where no response was received.
pub const NETWORK_ERROR_CODE: i64 = -1;
/// Code used for failures that match no other kind.
pub const OTHER_ERROR_CODE: i64 = -2;
/// Code used for client-side validation failures.
pub const VALIDATION_ERROR_CODE: i64 = -3;

/// The closed set of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Business,
    Unauthorized,
    Http,
    Network,
    Upload,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Business => "business",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Http => "http",
            ErrorKind::Network => "network",
            ErrorKind::Upload => "upload",
            ErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the transport, upload pipeline and utilities.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Local input was rejected before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The HTTP exchange succeeded but the backend reported a failure.
    #[error("business error {code}: {message}")]
    Business {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// The session is missing or expired (HTTP 401).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Non-2xx HTTP status other than 401.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// No response was received (connect failure, timeout, reset).
    #[error("network error: {message}")]
    Network { message: String },

    /// A file transfer was rejected or returned no result.
    #[error("upload failed: {message}")]
    Upload { status: Option<u16>, message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Business { .. } => ErrorKind::Business,
            Error::Unauthorized { .. } => ErrorKind::Unauthorized,
            Error::Http { .. } => ErrorKind::Http,
            Error::Network { .. } => ErrorKind::Network,
            Error::Upload { .. } => ErrorKind::Upload,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Numeric code carried by this error.
    pub fn code(&self) -> i64 {
        match self {
            Error::Validation(_) => VALIDATION_ERROR_CODE,
            Error::Business { code, .. } => *code,
            Error::Unauthorized { .. } => 401,
            Error::Http { status, .. } => i64::from(*status),
            Error::Network { .. } => NETWORK_ERROR_CODE,
            Error::Upload { status, .. } => status.map(i64::from).unwrap_or(NETWORK_ERROR_CODE),
            Error::Other(_) => OTHER_ERROR_CODE,
        }
    }

    /// Message as produced where the error originated.
    pub fn message(&self) -> &str {
        match self {
            Error::Validation(message) | Error::Other(message) => message,
            Error::Business { message, .. }
            | Error::Unauthorized { message }
            | Error::Http { message, .. }
            | Error::Network { message }
            | Error::Upload { message, .. } => message,
        }
    }

    /// HTTP status, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { .. } => Some(401),
            Error::Http { status, .. } => Some(*status),
            Error::Upload { status, .. } => *status,
            _ => None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Error::Network {
            message: message.into(),
        }
    }

    pub fn upload(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Upload {
            status,
            message: message.into(),
        }
    }
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

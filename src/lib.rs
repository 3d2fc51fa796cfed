//! Marketplace client network layer.
//!
//! Request transport with envelope interpretation and session expiry,
//! resilience utilities, and a multi-provider image upload pipeline.

pub mod auth;
pub mod config;
pub mod error;
pub mod observability;
pub mod resilience;
pub mod storage;
pub mod transport;
pub mod upload;

pub use auth::{CredentialStore, LoggingNavigator, Navigator};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, ErrorReporter, Result};
pub use transport::{HttpAdapter, ReqwestAdapter, Transport};
pub use upload::UploadPipeline;

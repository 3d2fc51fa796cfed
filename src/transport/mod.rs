//! Request transport subsystem.
//!
//! # Data Flow
//! ```text
//! caller / upload pipeline
//!     → request.rs (descriptor, query serialization)
//!     → client.rs (URL, headers, credential, request ID, timeout)
//!     → adapter.rs (HttpAdapter capability: reqwest or a test fake)
//!     → envelope.rs (HTTP status + business marker → value or Error)
//!     → client.rs (401: clear credential, navigate to login)
//!     → caller
//! ```
//!
//! # Design Decisions
//! - The platform HTTP/file capability is a trait so the core runs against fakes
//! - Every request owns its descriptor; nothing is shared between calls except the credential
//! - Envelope interpretation is a pure function of status and body

pub mod adapter;
pub mod client;
pub mod envelope;
pub mod file;
pub mod request;
pub mod reqwest_adapter;

pub use adapter::{
    AdapterError, HttpAdapter, HttpRequest, HttpResponse, ProgressFn, UploadRequest,
};
pub use client::{Transport, X_REQUEST_ID};
pub use envelope::Envelope;
pub use file::FileInfo;
pub use request::{Method, RequestDescriptor, RequestOptions};
pub use reqwest_adapter::ReqwestAdapter;

#[cfg(test)]
pub(crate) mod fake;

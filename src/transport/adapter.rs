//! Platform HTTP and file capability.
//!
//! The transport never touches sockets or the filesystem directly; it goes
//! through an [`HttpAdapter`] so tests can substitute a fake.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::transport::file::FileInfo;
use crate::transport::request::Method;

/// Upload progress in `[0, 1]`.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Failures where no HTTP response was obtained.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("file error: {0}")]
    File(String),
}

/// A fully resolved JSON request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A multipart file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub url: Url,
    pub file_path: PathBuf,
    /// Multipart field carrying the file.
    pub field_name: String,
    /// Text fields sent before the file part.
    pub form_fields: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl UploadRequest {
    pub fn new(url: Url, file_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            url,
            file_path: file_path.into(),
            field_name: "file".to_string(),
            form_fields: Vec::new(),
            headers: Vec::new(),
            timeout,
        }
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = name.into();
        self
    }

    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_fields.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form_fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpAdapter: Send + Sync {
    /// Send a JSON request and collect the whole response.
    async fn perform_request(&self, request: HttpRequest) -> Result<HttpResponse, AdapterError>;

    /// Stream a file as multipart form data.
    async fn perform_upload(
        &self,
        request: UploadRequest,
        progress: Option<ProgressFn>,
    ) -> Result<HttpResponse, AdapterError>;

    /// Size and type of a local file.
    async fn read_file(&self, path: &Path) -> Result<FileInfo, AdapterError>;
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

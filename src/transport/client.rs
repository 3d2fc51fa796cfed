//! The request transport.
//!
//! # Responsibilities
//! - Build the URL and headers of every call
//! - Inject the current credential and a request ID
//! - Enforce the timeout around the adapter call
//! - Interpret the response and run session expiry on 401

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;
use uuid::Uuid;

use crate::auth::{ClearReason, CredentialStore, Navigator};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::resilience::with_timeout;
use crate::transport::adapter::{
    AdapterError, HttpAdapter, HttpRequest, HttpResponse, ProgressFn, UploadRequest,
};
use crate::transport::envelope;
use crate::transport::file::FileInfo;
use crate::transport::request::{Method, RequestDescriptor, RequestOptions};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "X-Request-ID";

const AUTHORIZATION: &str = "Authorization";

pub struct Transport {
    api_root: String,
    default_headers: Vec<(String, String)>,
    timeout: Duration,
    upload_timeout: Duration,
    login_route: String,
    adapter: Arc<dyn HttpAdapter>,
    credentials: Arc<CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl Transport {
    pub fn new(
        config: &ClientConfig,
        adapter: Arc<dyn HttpAdapter>,
        credentials: Arc<CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api_root: config.api.api_root(),
            default_headers: config
                .api
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            timeout: config.api.timeout(),
            upload_timeout: Duration::from_millis(config.upload.timeout_ms),
            login_route: config.session.login_route.clone(),
            adapter,
            credentials,
            navigator,
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn adapter(&self) -> &Arc<dyn HttpAdapter> {
        &self.adapter
    }

    /// `{origin}/api/{version}`.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Deadline applied to file transfers.
    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    /// Absolute URL of an API path.
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let separator = if path.starts_with('/') { "" } else { "/" };
        let mut url = Url::parse(&format!("{}{}{}", self.api_root, separator, path))
            .map_err(|e| Error::Other(format!("invalid request URL for {}: {}", path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    /// Dispatch one request and interpret its envelope.
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value> {
        let mut descriptor = RequestDescriptor::new(method, path).options(options);
        descriptor.body = body;
        self.send(descriptor).await
    }

    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<Value> {
        let start = Instant::now();
        let method = descriptor.method;
        let path = descriptor.path.clone();
        let timeout = descriptor.options.timeout.unwrap_or(self.timeout);
        let request_id = Uuid::new_v4().to_string();
        let headers = self.headers(&descriptor.options.headers, &request_id);

        let (query, body) = descriptor.into_wire();
        let url = self.url_for(&path, &query)?;
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "Dispatching request");

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        };
        let response = with_timeout(timeout, async {
            self.adapter
                .perform_request(request)
                .await
                .map_err(adapter_failure)
        })
        .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                metrics::record_request(method.as_str(), 0, start);
                tracing::warn!(request_id = %request_id, method = %method, path = %path, error = %e, "Request failed");
                return Err(e);
            }
        };

        metrics::record_request(method.as_str(), response.status, start);
        tracing::debug!(
            request_id = %request_id,
            status = response.status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Response received"
        );
        self.settle(envelope::interpret(response.status, &response.body), &request_id)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Option<Value>) -> Result<T> {
        decode(self.dispatch(Method::Get, path, query, RequestOptions::default()).await?)
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        decode(self.dispatch(Method::Post, path, body, RequestOptions::default()).await?)
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        decode(self.dispatch(Method::Put, path, body, RequestOptions::default()).await?)
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        decode(self.dispatch(Method::Patch, path, body, RequestOptions::default()).await?)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, body: Option<Value>) -> Result<T> {
        decode(self.dispatch(Method::Delete, path, body, RequestOptions::default()).await?)
    }

    /// Upload `file` as multipart field `field` to an API path.
    pub async fn upload(
        &self,
        path: &str,
        file: &Path,
        field: &str,
        fields: Vec<(String, String)>,
        progress: Option<ProgressFn>,
    ) -> Result<Value> {
        let start = Instant::now();
        let request_id = Uuid::new_v4().to_string();

        let mut request = UploadRequest::new(self.url_for(path, &[])?, file, self.upload_timeout)
            .field_name(field);
        request.form_fields = fields;
        request.headers = self.headers(&[], &request_id);
        tracing::debug!(request_id = %request_id, path = %path, file = %file.display(), "Uploading file");

        let response = match self.send_external(request, progress).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_request(Method::Post.as_str(), 0, start);
                tracing::warn!(request_id = %request_id, path = %path, error = %e, "Upload failed");
                return Err(e);
            }
        };
        metrics::record_request(Method::Post.as_str(), response.status, start);
        self.settle(envelope::interpret_upload(response.status, &response.body), &request_id)
    }

    /// Multipart POST to a third-party URL. No credential, no envelope.
    pub async fn send_external(
        &self,
        request: UploadRequest,
        progress: Option<ProgressFn>,
    ) -> Result<HttpResponse> {
        let deadline = request.timeout;
        with_timeout(deadline, async {
            self.adapter
                .perform_upload(request, progress)
                .await
                .map_err(adapter_failure)
        })
        .await
    }

    /// Inspect a local file through the adapter.
    pub async fn read_file(&self, path: &Path) -> Result<FileInfo> {
        self.adapter
            .read_file(path)
            .await
            .map_err(|e| Error::Validation(format!("Cannot read file: {}", e)))
    }

    /// Clear the credential and send the user to the login route.
    pub fn end_session(&self, reason: ClearReason) {
        self.credentials.clear(reason);
        self.navigator.navigate_to_login(&self.login_route);
    }

    fn settle(&self, result: Result<Value>, request_id: &str) -> Result<Value> {
        if let Err(Error::Unauthorized { .. }) = &result {
            tracing::warn!(request_id = %request_id, "Session expired");
            self.end_session(ClearReason::Unauthorized);
        }
        result
    }

    /// Defaults, then per-call overrides, then the bearer token, then the request ID.
    fn headers(&self, overrides: &[(String, String)], request_id: &str) -> Vec<(String, String)> {
        let mut headers = self.default_headers.clone();
        for (name, value) in overrides {
            replace_header(&mut headers, name, value.clone());
        }
        if let Some(bearer) = self.credentials.bearer() {
            replace_header(&mut headers, AUTHORIZATION, bearer);
        }
        replace_header(&mut headers, X_REQUEST_ID, request_id.to_string());
        headers
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("api_root", &self.api_root)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn replace_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}

fn adapter_failure(e: AdapterError) -> Error {
    match e {
        AdapterError::File(message) => Error::upload(None, message),
        other => Error::network(other.to_string()),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::Other(format!("unexpected response payload: {}", e)))
}

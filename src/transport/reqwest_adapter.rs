//! [`HttpAdapter`] over a shared `reqwest::Client`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::path::Path;

use crate::transport::adapter::{
    AdapterError, HttpAdapter, HttpRequest, HttpResponse, ProgressFn, UploadRequest,
};
use crate::transport::file::{self, FileInfo};
use crate::transport::request::Method;

/// Size of each streamed upload chunk.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Production adapter. Cloning shares the connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestAdapter {
    client: reqwest::Client,
}

impl ReqwestAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpAdapter for ReqwestAdapter {
    async fn perform_request(&self, request: HttpRequest) -> Result<HttpResponse, AdapterError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url)
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| AdapterError::Transfer(e.to_string()))?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(classify)?;
        collect(response).await
    }

    async fn perform_upload(
        &self,
        request: UploadRequest,
        progress: Option<ProgressFn>,
    ) -> Result<HttpResponse, AdapterError> {
        let contents = tokio::fs::read(&request.file_path)
            .await
            .map_err(|e| AdapterError::File(format!("{}: {}", request.file_path.display(), e)))?;
        let total = contents.len();
        let mime = file::detect_mime(&request.file_path, &contents).unwrap_or(FALLBACK_MIME);

        let body = reqwest::Body::wrap_stream(progress_stream(contents, progress.clone()));
        let part = Part::stream_with_length(body, total as u64)
            .file_name(file::file_name(&request.file_path))
            .mime_str(mime)
            .map_err(|e| AdapterError::Transfer(e.to_string()))?;

        let mut form = Form::new();
        for (name, value) in request.form_fields {
            form = form.text(name, value);
        }
        form = form.part(request.field_name, part);

        let mut builder = self.client.post(request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            // The multipart boundary header is set by the form.
            if name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.multipart(form).send().await.map_err(classify)?;
        if total == 0 {
            if let Some(progress) = &progress {
                progress(1.0);
            }
        }
        collect(response).await
    }

    async fn read_file(&self, path: &Path) -> Result<FileInfo, AdapterError> {
        file::inspect(path)
            .await
            .map_err(|e| AdapterError::File(format!("{}: {}", path.display(), e)))
    }
}

/// Chunk `contents`, reporting `sent / total` as each chunk is handed to the connection.
fn progress_stream(
    contents: Vec<u8>,
    progress: Option<ProgressFn>,
) -> impl futures_util::Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + 'static {
    let total = contents.len();
    let chunks: Vec<Vec<u8>> = contents
        .chunks(UPLOAD_CHUNK_SIZE)
        .map(<[u8]>::to_vec)
        .collect();

    let mut sent = 0usize;
    futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len();
        if let Some(progress) = &progress {
            progress(sent as f64 / total as f64);
        }
        Ok::<_, std::io::Error>(chunk)
    }))
}

async fn collect(response: reqwest::Response) -> Result<HttpResponse, AdapterError> {
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(classify)?.to_vec();
    Ok(HttpResponse { status, body })
}

fn classify(e: reqwest::Error) -> AdapterError {
    if e.is_timeout() {
        AdapterError::Timeout
    } else if e.is_connect() {
        AdapterError::Connect(e.to_string())
    } else {
        AdapterError::Transfer(e.to_string())
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

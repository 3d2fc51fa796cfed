//! In-process adapter and navigator for unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::auth::Navigator;
use crate::transport::adapter::{
    AdapterError, HttpAdapter, HttpRequest, HttpResponse, ProgressFn, UploadRequest,
};
use crate::transport::file::FileInfo;

type Scripted = Result<HttpResponse, AdapterError>;

/// Replays scripted responses and records every call.
#[derive(Default)]
pub(crate) struct FakeAdapter {
    responses: Mutex<VecDeque<Scripted>>,
    upload_responses: Mutex<VecDeque<Scripted>>,
    files: Mutex<HashMap<PathBuf, FileInfo>>,
    requests: Mutex<Vec<HttpRequest>>,
    uploads: Mutex<Vec<UploadRequest>>,
    delay: Option<Duration>,
}

impl FakeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::json(status, &body)));
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_failure(&self, error: AdapterError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn push_upload_json(&self, status: u16, body: serde_json::Value) {
        self.upload_responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::json(status, &body)));
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, size: u64, mime: Option<&str>) {
        let path = path.into();
        self.files.lock().unwrap().insert(
            path.clone(),
            FileInfo {
                path,
                size,
                mime: mime.map(str::to_string),
            },
        );
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn network_calls(&self) -> usize {
        self.requests.lock().unwrap().len() + self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpAdapter for FakeAdapter {
    async fn perform_request(&self, request: HttpRequest) -> Result<HttpResponse, AdapterError> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(HttpResponse::json(200, &serde_json::json!({ "code": 0 }))))
    }

    async fn perform_upload(
        &self,
        request: UploadRequest,
        progress: Option<ProgressFn>,
    ) -> Result<HttpResponse, AdapterError> {
        self.uploads.lock().unwrap().push(request);
        if let Some(progress) = progress {
            progress(0.5);
            progress(1.0);
        }
        let next = self.upload_responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(HttpResponse::new(204, Vec::new())))
    }

    async fn read_file(&self, path: &Path) -> Result<FileInfo, AdapterError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| AdapterError::File(format!("{}: not found", path.display())))
    }
}

/// Counts login navigations.
#[derive(Default)]
pub(crate) struct CountingNavigator {
    count: AtomicUsize,
    last: Mutex<Option<String>>,
}

impl CountingNavigator {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn last_route(&self) -> Option<String> {
        self.last.lock().unwrap().clone()
    }
}

impl Navigator for CountingNavigator {
    fn navigate_to_login(&self, route: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(route.to_string());
    }
}

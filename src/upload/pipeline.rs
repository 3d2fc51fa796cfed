//! Upload orchestration.
//!
//! # Responsibilities
//! - Validate each file before any network call
//! - Drive the configured provider and forward progress
//! - Track each file through Validating → Transferring → Resolved
//! - Upload batches one file at a time, stopping at the first failure

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{ClientConfig, UploadConfig};
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::transport::{ProgressFn, Transport};
use crate::upload::provider::{provider_for, UploadProvider};
use crate::upload::validation::validate_file;

/// Batch progress: 1-based index, batch size, progress of that file.
pub type BatchProgressFn = Arc<dyn Fn(usize, usize, f64) + Send + Sync>;

/// Stage of an upload. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadStage {
    Validating,
    Transferring,
    Resolved,
}

/// One file in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTask {
    pub path: PathBuf,
    pub provider: &'static str,
    pub size: u64,
    pub mime: Option<String>,
    pub progress: f64,
    pub stage: UploadStage,
    pub url: Option<String>,
}

impl UploadTask {
    fn new(path: &Path, provider: &'static str) -> Self {
        Self {
            path: path.to_path_buf(),
            provider,
            size: 0,
            mime: None,
            progress: 0.0,
            stage: UploadStage::Validating,
            url: None,
        }
    }

    fn advance(&mut self, stage: UploadStage) {
        if stage > self.stage {
            self.stage = stage;
        }
    }
}

/// Clamps reported progress to `[0, 1]` and drops regressions.
struct ProgressTracker {
    latest: Arc<Mutex<f64>>,
    sink: Option<ProgressFn>,
}

impl ProgressTracker {
    fn new(sink: Option<ProgressFn>) -> Self {
        Self {
            latest: Arc::new(Mutex::new(0.0)),
            sink,
        }
    }

    fn callback(&self) -> ProgressFn {
        let latest = self.latest.clone();
        let sink = self.sink.clone();
        Arc::new(move |reported: f64| {
            let value = if reported.is_nan() { 0.0 } else { reported.clamp(0.0, 1.0) };
            {
                let mut last = latest.lock().unwrap_or_else(PoisonError::into_inner);
                if value < *last {
                    return;
                }
                *last = value;
            }
            if let Some(sink) = &sink {
                sink(value);
            }
        })
    }

    /// Report completion if the provider never reached 1.0.
    fn finish(&self) {
        let pending = {
            let mut last = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            let pending = *last < 1.0;
            *last = 1.0;
            pending
        };
        if let (true, Some(sink)) = (pending, &self.sink) {
            sink(1.0);
        }
    }
}

pub struct UploadPipeline {
    transport: Arc<Transport>,
    provider: Arc<dyn UploadProvider>,
    config: UploadConfig,
}

impl UploadPipeline {
    pub fn new(transport: Arc<Transport>, provider: Arc<dyn UploadProvider>, config: UploadConfig) -> Self {
        Self {
            transport,
            provider,
            config,
        }
    }

    /// Pipeline using the provider selected by `config.upload.method`.
    pub fn from_config(config: &ClientConfig, transport: Arc<Transport>) -> Self {
        let provider = provider_for(config, transport.clone());
        tracing::debug!(provider = provider.name(), "Upload pipeline ready");
        Self::new(transport, provider, config.upload.clone())
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Upload one file and return its tracked task.
    pub async fn upload_task(&self, path: &Path, progress: Option<ProgressFn>) -> Result<UploadTask> {
        let provider = self.provider.name();
        let mut task = UploadTask::new(path, provider);

        let checked = self
            .transport
            .read_file(path)
            .await
            .and_then(|info| validate_file(&info, &self.config).map(|_| info));
        let info = match checked {
            Ok(info) => info,
            Err(e) => {
                metrics::record_upload(provider, "rejected");
                tracing::warn!(path = %path.display(), error = %e, "Upload rejected");
                return Err(e);
            }
        };
        task.size = info.size;
        task.mime = info.mime.clone();
        task.advance(UploadStage::Transferring);

        let tracker = ProgressTracker::new(progress);
        match self.provider.upload(&info, Some(tracker.callback())).await {
            Ok(url) => {
                tracker.finish();
                task.progress = 1.0;
                task.url = Some(url);
                task.advance(UploadStage::Resolved);
                metrics::record_upload(provider, "success");
                tracing::info!(path = %path.display(), provider, size = task.size, "Upload complete");
                Ok(task)
            }
            Err(e) => {
                metrics::record_upload(provider, "failure");
                tracing::warn!(path = %path.display(), provider, error = %e, "Upload failed");
                Err(e)
            }
        }
    }

    /// Upload one file and return its public URL.
    pub async fn upload_one(&self, path: &Path, progress: Option<ProgressFn>) -> Result<String> {
        self.upload_task(path, progress)
            .await?
            .url
            .ok_or_else(|| Error::upload(None, "upload resolved without a URL"))
    }

    /// Upload files in order. The first failure aborts the rest.
    pub async fn upload_many<P: AsRef<Path>>(
        &self,
        paths: &[P],
        progress: Option<BatchProgressFn>,
    ) -> Result<Vec<String>> {
        let total = paths.len();
        let mut urls = Vec::with_capacity(total);

        for (i, path) in paths.iter().enumerate() {
            let index = i + 1;
            let item_progress = progress.clone().map(|batch| {
                Arc::new(move |p: f64| batch(index, total, p)) as ProgressFn
            });

            match self.upload_one(path.as_ref(), item_progress).await {
                Ok(url) => urls.push(url),
                Err(e) => {
                    tracing::warn!(index, total, error = %e, "Batch upload stopped");
                    return Err(e);
                }
            }
        }
        Ok(urls)
    }
}

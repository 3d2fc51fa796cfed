//! Upload provider strategy.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{ClientConfig, RetryConfig, UploadMethod};
use crate::error::Result;
use crate::transport::{FileInfo, ProgressFn, Transport};
use crate::upload::{CosProvider, DirectProvider, OssProvider};

/// Moves one validated file to storage and returns its public URL.
#[async_trait]
pub trait UploadProvider: Send + Sync {
    /// Label used in logs and metrics.
    fn name(&self) -> &'static str;

    async fn upload(&self, file: &FileInfo, progress: Option<ProgressFn>) -> Result<String>;
}

/// Build the provider selected by `config.upload.method`.
pub fn provider_for(config: &ClientConfig, transport: Arc<Transport>) -> Arc<dyn UploadProvider> {
    let upload = &config.upload;
    let fetch_policy = RetryConfig {
        max_attempts: upload.credential_fetch_attempts,
        initial_delay_ms: config.retry.initial_delay_ms,
    };

    match upload.method {
        UploadMethod::Server => Arc::new(DirectProvider::new(transport, upload.endpoint.clone())),
        UploadMethod::Cos => Arc::new(CosProvider::new(transport, upload.cos.clone(), fetch_policy)),
        UploadMethod::Oss => Arc::new(OssProvider::new(transport, upload.oss.clone(), fetch_policy)),
    }
}

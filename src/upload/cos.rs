//! Tencent Cloud COS uploads with delegated credentials.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::config::{BucketConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::resilience::retry_with;
use crate::transport::{FileInfo, ProgressFn, Transport, UploadRequest};
use crate::upload::direct::FILE_FIELD;
use crate::upload::key::object_key;
use crate::upload::provider::UploadProvider;

pub const COS_CREDENTIALS_PATH: &str = "/upload/cos-credentials";

/// Temporary credentials issued by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosCredentials {
    pub session_token: String,
    pub authorization: String,
}

pub struct CosProvider {
    transport: Arc<Transport>,
    bucket: BucketConfig,
    fetch_policy: RetryConfig,
}

impl CosProvider {
    pub fn new(transport: Arc<Transport>, bucket: BucketConfig, fetch_policy: RetryConfig) -> Self {
        Self {
            transport,
            bucket,
            fetch_policy,
        }
    }

    /// `https://{bucket}.cos.{region}.myqcloud.com`
    pub fn host(&self) -> String {
        format!("https://{}.cos.{}.myqcloud.com", self.bucket.bucket, self.bucket.region)
    }

    async fn credentials(&self) -> Result<CosCredentials> {
        let transport = &self.transport;
        retry_with(&self.fetch_policy, move || {
            transport.get::<CosCredentials>(COS_CREDENTIALS_PATH, None)
        })
        .await
    }
}

#[async_trait]
impl UploadProvider for CosProvider {
    fn name(&self) -> &'static str {
        "cos"
    }

    async fn upload(&self, file: &FileInfo, progress: Option<ProgressFn>) -> Result<String> {
        let credentials = self.credentials().await?;
        let key = object_key(file.mime.as_deref());
        let object_url = format!("{}/{}", self.host(), key);
        let url = Url::parse(&object_url)
            .map_err(|e| Error::Other(format!("invalid COS URL {}: {}", object_url, e)))?;

        let request = UploadRequest::new(url, &file.path, self.transport.upload_timeout())
            .field_name(FILE_FIELD)
            .form_field("key", key.as_str())
            .form_field("x-cos-security-token", credentials.session_token)
            .form_field("x-cos-meta-fileid", key.as_str())
            .header("Authorization", credentials.authorization);

        let response = self.transport.send_external(request, progress).await?;
        if !response.is_success() {
            return Err(Error::upload(Some(response.status), "COS rejected the upload"));
        }
        tracing::debug!(key = %key, "Stored object in COS");
        Ok(object_url)
    }
}

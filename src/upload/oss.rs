//! Alibaba Cloud OSS uploads with a backend-signed policy.

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

pub const OSS_CREDENTIALS_PATH: &str = "/upload/oss-credentials";

/// STS credentials and POST policy issued by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OssCredentials {
    pub policy: String,
    pub access_key_id: String,
    pub signature: String,
    pub security_token: String,
}

pub struct OssProvider {
    transport: Arc<Transport>,
    bucket: BucketConfig,
    fetch_policy: RetryConfig,
}

impl OssProvider {
    pub fn new(transport: Arc<Transport>, bucket: BucketConfig, fetch_policy: RetryConfig) -> Self {
        Self {
            transport,
            bucket,
            fetch_policy,
        }
    }

    /// `https://{bucket}.{region}.aliyuncs.com`
    pub fn host(&self) -> String {
        format!("https://{}.{}.aliyuncs.com", self.bucket.bucket, self.bucket.region)
    }
}

#[async_trait]
impl UploadProvider for OssProvider {
    fn name(&self) -> &'static str {
        "oss"
    }

    async fn upload(&self, file: &FileInfo, progress: Option<ProgressFn>) -> Result<String> {
        let transport = &self.transport;
        let credentials: OssCredentials = retry_with(&self.fetch_policy, move || {
            transport.get::<OssCredentials>(OSS_CREDENTIALS_PATH, None)
        })
        .await?;

        let host = self.host();
        let url = Url::parse(&host).map_err(|e| Error::Other(format!("invalid OSS host {}: {}", host, e)))?;
        let key = object_key(file.mime.as_deref());

        let request = UploadRequest::new(url, &file.path, self.transport.upload_timeout())
            .field_name(FILE_FIELD)
            .form_field("key", key.as_str())
            .form_field("policy", credentials.policy)
            .form_field("OSSAccessKeyId", credentials.access_key_id)
            .form_field("signature", credentials.signature)
            .form_field("x-oss-security-token", credentials.security_token);

        let response = self.transport.send_external(request, progress).await?;
        if !response.is_success() {
            return Err(Error::upload(Some(response.status), "OSS rejected the upload"));
        }
        tracing::debug!(key = %key, "Stored object in OSS");
        Ok(format!("{}/{}", host, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialStore;
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use crate::transport::fake::{CountingNavigator, FakeAdapter};
    use serde_json::json;
    use std::path::PathBuf;

    fn provider(adapter: Arc<FakeAdapter>) -> OssProvider {
        let transport = Transport::new(
            &ClientConfig::default(),
            adapter,
            Arc::new(CredentialStore::in_memory()),
            Arc::new(CountingNavigator::default()),
        );
        OssProvider::new(
            Arc::new(transport),
            BucketConfig {
                bucket: "hoho-media".into(),
                region: "oss-cn-hangzhou".into(),
            },
            RetryConfig {
                max_attempts: 1,
                initial_delay_ms: 100,
            },
        )
    }

    fn file() -> FileInfo {
        FileInfo {
            path: PathBuf::from("/tmp/banner.gif"),
            size: 1024,
            mime: Some("image/gif".into()),
        }
    }

    #[tokio::test]
    async fn test_oss_upload_form_and_url() {
        let adapter = Arc::new(FakeAdapter::new());
        adapter.push_json(
            200,
            json!({ "code": 0, "data": {
                "policy": "eyJleHBpcmF0aW9uIjoi",
                "accessKeyId": "STS.key",
                "signature": "sig==",
                "securityToken": "tok"
            }}),
        );
        let provider = provider(adapter.clone());

        // Default fake reply is 204, which OSS uses for a stored object.
        let url = provider.upload(&file(), None).await.unwrap();
        assert!(url.starts_with("https://hoho-media.oss-cn-hangzhou.aliyuncs.com/images/"));
        assert!(url.ends_with(".gif"));

        let upload = &adapter.uploads()[0];
        assert_eq!(upload.url.as_str(), "https://hoho-media.oss-cn-hangzhou.aliyuncs.com/");
        assert!(url.ends_with(upload.form_value("key").unwrap()));
        assert_eq!(upload.form_value("policy"), Some("eyJleHBpcmF0aW9uIjoi"));
        assert_eq!(upload.form_value("OSSAccessKeyId"), Some("STS.key"));
        assert_eq!(upload.form_value("signature"), Some("sig=="));
        assert_eq!(upload.form_value("x-oss-security-token"), Some("tok"));
    }

    #[tokio::test]
    async fn test_malformed_credentials() {
        let adapter = Arc::new(FakeAdapter::new());
        adapter.push_json(200, json!({ "code": 0, "data": { "policy": "p" } }));
        let provider = provider(adapter.clone());

        let err = provider.upload(&file(), None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(adapter.uploads().is_empty());
    }
}

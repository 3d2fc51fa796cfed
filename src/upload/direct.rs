//! Direct upload to the backend.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::transport::{FileInfo, ProgressFn, Transport};
use crate::upload::provider::UploadProvider;

pub const FILE_FIELD: &str = "file";

pub struct DirectProvider {
    transport: Arc<Transport>,
    endpoint: String,
}

impl DirectProvider {
    pub fn new(transport: Arc<Transport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl UploadProvider for DirectProvider {
    fn name(&self) -> &'static str {
        "server"
    }

    async fn upload(&self, file: &FileInfo, progress: Option<ProgressFn>) -> Result<String> {
        let result = self
            .transport
            .upload(&self.endpoint, &file.path, FILE_FIELD, Vec::new(), progress)
            .await?;
        url_of(&result).ok_or_else(|| Error::upload(None, "upload response carried no URL"))
    }
}

fn url_of(result: &Value) -> Option<String> {
    match result {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(map) => map
            .get("url")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the marketplace client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend API location and request defaults.
    pub api: ApiConfig,

    /// Session-expiry behaviour.
    pub session: SessionConfig,

    /// Upload pipeline settings.
    pub upload: UploadConfig,

    /// Defaults for caller-requested retries.
    pub retry: RetryConfig,

    /// Persistent state location.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Deployment environment, selects the default backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:8080",
            Environment::Production => "https://api.hoho.app",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub environment: Environment,

    /// Explicit backend origin; overrides the environment default.
    pub base_url: Option<String>,

    /// Version segment of the API prefix (`/api/{version}`).
    pub api_version: String,

    /// Default per-request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            environment: Environment::default(),
            base_url: None,
            api_version: "v1".to_string(),
            timeout_ms: 10_000,
            headers,
        }
    }
}

impl ApiConfig {
    /// Backend origin, without a trailing slash.
    pub fn origin(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Prefix every request path is appended to: `{origin}/api/{version}`.
    pub fn api_root(&self) -> String {
        format!("{}/api/{}", self.origin(), self.api_version)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Session-expiry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Route the navigator is sent to when the session ends.
    pub login_route: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_route: "/pages/auth/login".to_string(),
        }
    }
}

/// Which upload provider the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadMethod {
    /// Multipart POST to the backend's own upload endpoint.
    #[default]
    Server,
    /// Tencent Cloud COS with delegated credentials.
    Cos,
    /// Alibaba Cloud OSS with a signed policy.
    Oss,
}

impl fmt::Display for UploadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UploadMethod::Server => "server",
            UploadMethod::Cos => "cos",
            UploadMethod::Oss => "oss",
        })
    }
}

/// Cloud storage bucket location.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BucketConfig {
    pub bucket: String,
    pub region: String,
}

fn default_cos_bucket() -> BucketConfig {
    BucketConfig {
        bucket: "your-bucket-name".to_string(),
        region: "ap-guangzhou".to_string(),
    }
}

fn default_oss_bucket() -> BucketConfig {
    BucketConfig {
        bucket: "your-bucket-name".to_string(),
        region: "oss-cn-hangzhou".to_string(),
    }
}

/// Upload pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    pub method: UploadMethod,

    /// Backend path for direct uploads.
    pub endpoint: String,

    /// Maximum file size in bytes.
    pub max_size: u64,

    /// MIME types accepted by validation.
    pub allowed_types: Vec<String>,

    /// Attempts when fetching delegated credentials (1 = no retry).
    pub credential_fetch_attempts: u32,

    /// Per-transfer timeout in milliseconds.
    pub timeout_ms: u64,

    #[serde(default = "default_cos_bucket")]
    pub cos: BucketConfig,

    #[serde(default = "default_oss_bucket")]
    pub oss: BucketConfig,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            method: UploadMethod::default(),
            endpoint: "/upload".to_string(),
            max_size: 10 * 1024 * 1024, // 10MB
            allowed_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
            credential_fetch_attempts: 1,
            timeout_ms: 60_000,
            cos: default_cos_bucket(),
            oss: default_oss_bucket(),
        }
    }
}

/// Retry configuration for operations callers explicitly wrap.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds; doubles each retry.
    pub initial_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
        }
    }
}

/// Persistent state configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding credential, error log and cache entries.
    /// In-memory storage is used when absent.
    pub path: Option<PathBuf>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

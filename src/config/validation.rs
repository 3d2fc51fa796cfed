//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, sizes > 0)
//! - Check the selected upload provider is fully configured
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is handed to any subsystem

use std::fmt;

use crate::config::schema::{BucketConfig, ClientConfig, UploadMethod};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let origin = config.api.origin();
    match url::Url::parse(&origin) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "api.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("api.base_url", format!("invalid URL: {}", e))),
    }

    if config.api.api_version.trim().is_empty() {
        errors.push(ValidationError::new("api.api_version", "must not be empty"));
    }
    if config.api.timeout_ms == 0 {
        errors.push(ValidationError::new("api.timeout_ms", "must be greater than zero"));
    }
    for (name, value) in &config.api.headers {
        if reqwest::header::HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(format!("api.headers.{}", name), "invalid header name"));
        }
        if reqwest::header::HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::new(format!("api.headers.{}", name), "invalid header value"));
        }
    }

    if !config.session.login_route.starts_with('/') {
        errors.push(ValidationError::new("session.login_route", "must start with '/'"));
    }

    let upload = &config.upload;
    if !upload.endpoint.starts_with('/') {
        errors.push(ValidationError::new("upload.endpoint", "must start with '/'"));
    }
    if upload.max_size == 0 {
        errors.push(ValidationError::new("upload.max_size", "must be greater than zero"));
    }
    if upload.allowed_types.is_empty() {
        errors.push(ValidationError::new("upload.allowed_types", "must list at least one type"));
    }
    for mime in &upload.allowed_types {
        if mime.split_once('/').map_or(true, |(a, b)| a.is_empty() || b.is_empty()) {
            errors.push(ValidationError::new(
                "upload.allowed_types",
                format!("'{}' is not a MIME type", mime),
            ));
        }
    }
    if upload.credential_fetch_attempts == 0 {
        errors.push(ValidationError::new("upload.credential_fetch_attempts", "must be at least 1"));
    }
    if upload.timeout_ms == 0 {
        errors.push(ValidationError::new("upload.timeout_ms", "must be greater than zero"));
    }
    match upload.method {
        UploadMethod::Server => {}
        UploadMethod::Cos => check_bucket("upload.cos", &upload.cos, &mut errors),
        UploadMethod::Oss => check_bucket("upload.oss", &upload.oss, &mut errors),
    }

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::new("retry.max_attempts", "must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_bucket(prefix: &str, bucket: &BucketConfig, errors: &mut Vec<ValidationError>) {
    // Bucket and region end up in a host name.
    let valid = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid(&bucket.bucket) {
        errors.push(ValidationError::new(format!("{}.bucket", prefix), "must be a non-empty DNS label"));
    }
    if !valid(&bucket.region) {
        errors.push(ValidationError::new(format!("{}.region", prefix), "must be a non-empty DNS label"));
    }
}

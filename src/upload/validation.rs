//! Pre-upload file checks.

use crate::config::UploadConfig;
use crate::error::{Error, Result};
use crate::transport::FileInfo;

const MIB: u64 = 1024 * 1024;

/// Reject files that are too large or of a type the marketplace does not accept.
pub fn validate_file(info: &FileInfo, config: &UploadConfig) -> Result<()> {
    if info.size > config.max_size {
        return Err(Error::Validation(format!(
            "Image size cannot exceed {}",
            format_size(config.max_size)
        )));
    }

    match info.mime.as_deref() {
        Some(mime) if config.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(mime)) => Ok(()),
        Some(mime) => Err(Error::Validation(format!("Unsupported file type: {}", mime))),
        None => Err(Error::Validation("Unsupported file type".to_string())),
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

//! Local file inspection for uploads.

use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Bytes read from the head of a file to detect its type.
pub const SNIFF_LEN: usize = 16;

/// Metadata of a file about to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    /// Detected MIME type, `None` when neither content nor extension is recognized.
    pub mime: Option<String>,
}

impl FileInfo {
    /// Name sent as the multipart file name.
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

/// Inspect `path`: size from metadata, MIME from magic bytes then extension.
pub async fn inspect(path: &Path) -> std::io::Result<FileInfo> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ));
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    let file = tokio::fs::File::open(path).await?;
    file.take(SNIFF_LEN as u64).read_to_end(&mut head).await?;

    Ok(FileInfo {
        path: path.to_path_buf(),
        size: metadata.len(),
        mime: detect_mime(path, &head).map(str::to_string),
    })
}

/// MIME type from content, falling back to the extension.
pub fn detect_mime(path: &Path, head: &[u8]) -> Option<&'static str> {
    sniff_mime(head).or_else(|| mime_from_extension(path))
}

/// Recognize the image signatures the marketplace accepts.
pub fn sniff_mime(head: &[u8]) -> Option<&'static str> {
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if head.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Canonical extension for an object key.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}

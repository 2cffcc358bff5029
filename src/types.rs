//! Shared types used across the compression, ingestion and upload stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An image file held in memory, as received from a file picker, camera
/// capture or drag-and-drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Original file name, including extension.
    pub name: String,
    /// MIME type reported by the source (`image/jpeg`, `image/png`, ...).
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub last_modified: DateTime<Utc>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
            last_modified: Utc::now(),
        }
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension of `name`, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Guess a MIME type from a file extension.
///
/// Used when reading files from disk, where no browser supplies one.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_counts_bytes() {
        let file = ImageFile::new("a.jpg", "image/jpeg", vec![0; 2048]);
        assert_eq!(file.size(), 2048);
    }

    #[test]
    fn extension_is_lowercased() {
        let file = ImageFile::new("IMG_0001.JPEG", "image/jpeg", Vec::new());
        assert_eq!(file.extension().as_deref(), Some("jpeg"));
    }

    #[test]
    fn extension_missing() {
        let file = ImageFile::new("README", "text/plain", Vec::new());
        assert_eq!(file.extension(), None);
    }

    #[test]
    fn content_type_known_and_unknown() {
        assert_eq!(content_type_for_extension("JPG"), "image/jpeg");
        assert_eq!(content_type_for_extension("webp"), "image/webp");
        assert_eq!(content_type_for_extension("heic"), "application/octet-stream");
    }
}

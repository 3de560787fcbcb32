//! # Upload Service
//!
//! Stores project images sent by the admin panel and serves them back.
//!
//! ```text
//! POST /api/upload  (Content-Type: image/png, raw body)
//!              ↓
//! check type, size
//!              ↓
//! write <UPLOAD_DIR>/<uuid>.png
//!              ↓
//! { "url": "/uploads/<uuid>.png", "size": 1234, "contentType": "image/png" }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::UploadResponse;

/// Accepted image types and the extension they are stored under.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("No file uploaded")]
    Empty,

    #[error("File is too large ({size} bytes, limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Upload storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extension for an accepted content type. Parameters such as
/// `; charset=...` are ignored.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Content type a stored file is served with.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
    IMAGE_TYPES
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(mime, _)| *mime)
}

#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
    url_prefix: String,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    /// Create the upload directory if it does not exist.
    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Reject a body before it is fully read.
    pub fn check_size(&self, size: usize) -> Result<(), UploadError> {
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Store an image and return its public URL.
    pub async fn store(&self, content_type: &str, bytes: &[u8]) -> Result<UploadResponse, UploadError> {
        let ext = extension_for(content_type)
            .ok_or_else(|| UploadError::UnsupportedType(content_type.to_string()))?;
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        self.check_size(bytes.len())?;

        self.ensure_dir().await?;
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        fs::write(self.dir.join(&file_name), bytes).await?;

        info!("🖼️  Stored upload {} ({} bytes)", file_name, bytes.len());

        Ok(UploadResponse {
            url: format!("{}/{}", self.url_prefix, file_name),
            size: bytes.len(),
            content_type: content_type_for(&file_name)
                .unwrap_or("application/octet-stream")
                .to_string(),
        })
    }

    /// Read a stored image. Returns the bytes and their content type.
    pub async fn read(&self, file_name: &str) -> Result<(Vec<u8>, &'static str), UploadError> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return Err(UploadError::InvalidName(file_name.to_string()));
        }
        let content_type = content_type_for(file_name)
            .ok_or_else(|| UploadError::InvalidName(file_name.to_string()))?;

        debug!("Serving upload {}", file_name);
        match fs::read(self.dir.join(file_name)).await {
            Ok(bytes) => Ok((bytes, content_type)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(UploadError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(UploadError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("IMAGE/JPEG; charset=binary"), Some("jpg"));
        assert_eq!(extension_for("text/html"), None);
        assert_eq!(content_type_for("a.jpeg"), Some("image/jpeg"));
        assert_eq!(content_type_for("a.exe"), None);
    }

    #[tokio::test]
    async fn test_store_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(dir.path(), "/uploads/", 1024);

        let stored = service.store("image/png", b"\x89PNG fake").await.unwrap();
        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.url.ends_with(".png"));
        assert_eq!(stored.size, 9);

        let name = stored.url.trim_start_matches("/uploads/");
        let (bytes, content_type) = service.read(name).await.unwrap();
        assert_eq!(bytes, b"\x89PNG fake");
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn test_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(dir.path(), "/uploads", 4);

        assert!(matches!(
            service.store("application/pdf", b"%PDF").await,
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(service.store("image/gif", b"").await, Err(UploadError::Empty)));
        assert!(matches!(
            service.store("image/gif", b"GIF89a").await,
            Err(UploadError::TooLarge { size: 6, limit: 4 })
        ));
        assert!(matches!(
            service.read("../secret.png").await,
            Err(UploadError::InvalidName(_))
        ));
        assert!(matches!(
            service.read("missing.png").await,
            Err(UploadError::NotFound(_))
        ));
    }
}

//! File storage abstraction for uploaded images.
//!
//! Complaints, events, lost-and-found posts, marketplace listings and club
//! galleries all accept an optional image. Handlers hand the bytes to a
//! [`FileStorage`] and persist the returned URL; the backend decides where the
//! bytes live (hosted image service or the local disk).
//!
//! # Example
//!
//! ```ignore
//! use campusdesk_core::file_storage::{FileStorage, LocalFileStorage};
//! use std::path::PathBuf;
//!
//! let storage = LocalFileStorage::new(
//!     PathBuf::from("./uploads"),
//!     "http://localhost:8000/uploads".to_string(),
//! );
//!
//! let stored = storage.store("problems", "leak.png", Some("image/png"), &bytes).await?;
//! println!("{}", stored.url);
//! ```

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::fs;
use uuid::Uuid;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Image types accepted by every backend.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/gif"];

/// Default upload ceiling (5 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// A file persisted by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Backend-specific identifier, used for deletion.
    pub key: String,
    /// Public URL stored on the owning record.
    pub url: String,
}

/// Storage backend for uploaded files.
///
/// Object-safe so that `AppState` can hold an `Arc<dyn FileStorage>` and tests
/// can swap in the local backend.
pub trait FileStorage: Send + Sync {
    /// Persist `content` under `folder` and return its key and public URL.
    fn store<'a>(
        &'a self,
        folder: &'a str,
        file_name: &'a str,
        content_type: Option<&'a str>,
        content: &'a [u8],
    ) -> StorageFuture<'a, StoredFile>;

    /// Delete a previously stored file. Missing files are not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;
}

#[derive(Debug)]
pub enum StorageError {
    /// File exceeds maximum allowed size.
    InvalidFileSize { max_bytes: usize },

    /// MIME type not allowed.
    InvalidMimeType {
        received: String,
        allowed: Vec<String>,
    },

    /// I/O error on the local backend.
    IoError(std::io::Error),

    /// Invalid storage key format.
    InvalidKey(String),

    /// The remote image service rejected or failed the upload.
    Upstream(String),
}

impl StorageError {
    /// Whether the error was caused by the uploaded file itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFileSize { .. } | Self::InvalidMimeType { .. } | Self::InvalidKey(_)
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received, allowed } => {
                write!(
                    f,
                    "MIME type '{}' not allowed. Allowed types: {}",
                    received,
                    allowed.join(", ")
                )
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
            Self::Upstream(msg) => write!(f, "Upload failed: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Size and type checks shared by all backends.
pub fn validate_upload(
    content_type: Option<&str>,
    content: &[u8],
    max_file_size: usize,
) -> Result<(), StorageError> {
    if content.len() > max_file_size {
        return Err(StorageError::InvalidFileSize {
            max_bytes: max_file_size,
        });
    }

    if let Some(received) = content_type
        && !ALLOWED_IMAGE_TYPES.contains(&received)
    {
        return Err(StorageError::InvalidMimeType {
            received: received.to_string(),
            allowed: ALLOWED_IMAGE_TYPES.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(())
}

/// Lowercased extension of `file_name`, restricted to a safe character set.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Local filesystem storage, served over HTTP from `base_url`.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self::with_max_size(base_dir, base_url, DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_size(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Validate storage key format to prevent path traversal.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

impl FileStorage for LocalFileStorage {
    fn store<'a>(
        &'a self,
        folder: &'a str,
        file_name: &'a str,
        content_type: Option<&'a str>,
        content: &'a [u8],
    ) -> StorageFuture<'a, StoredFile> {
        Box::pin(async move {
            validate_upload(content_type, content, self.max_file_size)?;

            let key = match file_extension(file_name) {
                Some(ext) => format!("{}/{}.{}", folder, Uuid::new_v4(), ext),
                None => format!("{}/{}", folder, Uuid::new_v4()),
            };
            Self::validate_key(&key)?;

            let file_path = self.base_dir.join(&key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            Ok(StoredFile {
                url: self.url_for(&key),
                key,
            })
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }
}

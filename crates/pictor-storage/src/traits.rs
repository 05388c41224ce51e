//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use pictor_core::{ErrorMetadata, LogLevel};
use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ErrorMetadata for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::UploadFailed(_) => "STORE_UPLOAD_FAILED",
            StorageError::DownloadFailed(_) => "STORE_DOWNLOAD_FAILED",
            StorageError::DeleteFailed(_) => "STORE_DELETE_FAILED",
            StorageError::NotFound(_) => "STORE_NOT_FOUND",
            StorageError::InvalidKey(_) => "STORE_INVALID_KEY",
            StorageError::BackendError(_) => "STORE_BACKEND_ERROR",
            StorageError::IoError(_) => "STORE_IO_ERROR",
            StorageError::ConfigError(_) => "STORE_CONFIG_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::DownloadFailed(_)
                | StorageError::DeleteFailed(_)
                | StorageError::BackendError(_)
                | StorageError::IoError(_)
        )
    }

    fn log_level(&self) -> LogLevel {
        match self {
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => LogLevel::Debug,
            StorageError::ConfigError(_) => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Payload handed to [`Storage::put`].
#[derive(Debug, Clone)]
pub enum ObjectBody {
    /// In-memory bytes.
    Bytes(Bytes),
    /// A local file, streamed by the backend.
    File(PathBuf),
}

impl From<Bytes> for ObjectBody {
    fn from(bytes: Bytes) -> Self {
        ObjectBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ObjectBody {
    fn from(data: Vec<u8>) -> Self {
        ObjectBody::Bytes(Bytes::from(data))
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The pipeline works with any backend without coupling to its details.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `body` under `key` with the given content type.
    ///
    /// Returns the externally reachable URL of the stored object.
    async fn put(&self, key: &str, body: ObjectBody, content_type: &str) -> StorageResult<String>;

    /// Download an object by its storage key
    async fn download(&self, key: &str) -> StorageResult<Bytes>;

    /// Delete an object by its storage key.
    ///
    /// A missing object is not an error. Returns `false` when the backend
    /// knows the object was already absent, `true` otherwise.
    async fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public URL for a key, whether or not the object exists.
    fn public_url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

use crate::keys;
use crate::traits::{ObjectBody, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored objects (e.g., "/var/lib/pictor/media")
    /// * `base_url` - Base URL the directory is served from (e.g., "http://localhost:8080/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a storage key to a filesystem path under the base directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        keys::validate_key(key)?;
        if key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(key);

        // Existing paths may be symlinks; make sure they stay inside the root.
        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_body(&self, path: &Path, body: ObjectBody) -> StorageResult<u64> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let size = match body {
            ObjectBody::Bytes(bytes) => {
                file.write_all(&bytes).await.map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to write file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                bytes.len() as u64
            }
            ObjectBody::File(source) => {
                let mut reader = fs::File::open(&source).await.map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to open {}: {}",
                        source.display(),
                        e
                    ))
                })?;
                tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to copy {} to {}: {}",
                        source.display(),
                        path.display(),
                        e
                    ))
                })?
            }
        };

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(size)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, key: &str, body: ObjectBody, content_type: &str) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();
        let result = self.write_body(&path, body).await;

        let size = match result {
            Ok(size) => size,
            Err(e) => {
                // Never leave a truncated object behind.
                let _ = fs::remove_file(&path).await;
                tracing::error!(
                    error = %e,
                    path = %path.display(),
                    key = %key,
                    "Local storage upload failed"
                );
                return Err(e);
            }
        };

        let url = keys::public_url(&self.base_url, key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn download(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage delete successful"
                );
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_url(&self, key: &str) -> String {
        keys::public_url(&self.base_url, key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:8080/media/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_put_download() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let url = storage
            .put(
                "u1/original/a1_original.jpg",
                Bytes::from_static(b"test data").into(),
                "image/jpeg",
            )
            .await
            .unwrap();

        assert_eq!(
            url,
            "http://localhost:8080/media/u1/original/a1_original.jpg"
        );
        let downloaded = storage.download("u1/original/a1_original.jpg").await.unwrap();
        assert_eq!(&downloaded[..], b"test data");
    }

    #[tokio::test]
    async fn test_local_storage_put_from_file() {
        let dir = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let source = scratch.path().join("a1_thumb.png");
        fs::write(&source, b"thumb bytes").await.unwrap();

        let storage = storage(dir.path()).await;
        storage
            .put("thumb/a1_thumb.png", ObjectBody::File(source.clone()), "image/png")
            .await
            .unwrap();

        let downloaded = storage.download("thumb/a1_thumb.png").await.unwrap();
        assert_eq!(&downloaded[..], b"thumb bytes");
        // The source is left for the caller to release.
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_storage_delete_reports_absence() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .put("file/doc_file.pdf", Bytes::from_static(b"%PDF").into(), "application/pdf")
            .await
            .unwrap();

        assert!(storage.delete("file/doc_file.pdf").await.unwrap());
        assert!(!storage.delete("file/doc_file.pdf").await.unwrap());
        assert!(!storage.exists("file/doc_file.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_put_leaves_nothing() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage
            .put(
                "thumb/missing.jpg",
                ObjectBody::File(dir.path().join("not-there.jpg")),
                "image/jpeg",
            )
            .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(!storage.exists("thumb/missing.jpg").await.unwrap());
    }
}

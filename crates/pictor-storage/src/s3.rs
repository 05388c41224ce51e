use crate::keys;
use crate::traits::{ObjectBody, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// S3 storage implementation
///
/// Backed by an `object_store` client, so any S3-compatible provider works.
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO, "https://nyc3.digitaloceanspaces.com" for DigitalOcean Spaces)
    ///
    /// Credentials are read from the standard `AWS_*` environment variables.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), bucket, region, endpoint_url))
    }

    /// Wrap an already configured object store.
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        }
    }

    /// In-memory store with S3 URL semantics, for tests and dry runs.
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        Self::with_store(
            Arc::new(InMemory::new()),
            bucket.into(),
            "us-east-1".to_string(),
            None,
        )
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path style: {endpoint}/{bucket}/{key}
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket);
            keys::public_url(&base_url, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    fn content_type_attributes(content_type: &str) -> Attributes {
        let mut attributes = Attributes::new();
        if !content_type.is_empty() {
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
        }
        attributes
    }

    async fn put_bytes(
        &self,
        location: &Path,
        bytes: Bytes,
        attributes: Attributes,
    ) -> StorageResult<u64> {
        let size = bytes.len() as u64;
        let options = PutOptions {
            attributes,
            ..Default::default()
        };
        let result: ObjectResult<_> = self
            .store
            .put_opts(location, PutPayload::from(bytes), options)
            .await;
        result.map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        Ok(size)
    }

    async fn put_file(
        &self,
        location: &Path,
        path: &std::path::Path,
        attributes: Attributes,
    ) -> StorageResult<u64> {
        let mut file = tokio::fs::File::open(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let mut writer =
            BufWriter::new(Arc::clone(&self.store), location.clone()).with_attributes(attributes);

        let copied = match tokio::io::copy(&mut file, &mut writer).await {
            Ok(copied) => copied,
            Err(e) => {
                // Drop any multipart state already created.
                let _ = writer.abort().await;
                return Err(StorageError::UploadFailed(format!(
                    "Failed to stream {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        writer
            .shutdown()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        Ok(copied)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(&self, key: &str, body: ObjectBody, content_type: &str) -> StorageResult<String> {
        keys::validate_key(key)?;
        let location = Path::from(key.to_string());
        let attributes = Self::content_type_attributes(content_type);
        let start = std::time::Instant::now();

        let result = match body {
            ObjectBody::Bytes(bytes) => self.put_bytes(&location, bytes, attributes).await,
            ObjectBody::File(ref path) => self.put_file(&location, path, attributes).await,
        };

        let size = result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            e
        })?;

        let url = self.generate_url(key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    async fn download(&self, key: &str) -> StorageResult<Bytes> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes)
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        keys::validate_key(key)?;
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        // S3 acknowledges deletes of absent keys, so ask first.
        match self.store.head(&location).await {
            Ok(_) => {}
            Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(bucket = %self.bucket, key = %key, "S3 object already absent");
                return Ok(false);
            }
            Err(e) => return Err(StorageError::DeleteFailed(e.to_string())),
        }

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete successful"
                );
                Ok(true)
            }
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use pictor_core::{
    Config, FormatPreset, ImageFormatKind, PipelineConfig, ResizeOptions, SizeSpec, StagingMode,
};
use pictor_processing::{MediaProvider, TransformError, VariantTransformer};
use pictor_storage::{ObjectBody, Storage, StorageBackend, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "https://cdn.example.com";

/// In-memory storage that records every call.
#[derive(Default)]
pub struct RecordingStorage {
    objects: Mutex<BTreeMap<String, (Bytes, String)>>,
    puts: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    fail_put_containing: Mutex<Option<String>>,
    fail_delete_containing: Mutex<Option<String>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every put whose key contains `needle` fail.
    pub fn fail_puts_containing(&self, needle: &str) {
        *self.fail_put_containing.lock().unwrap() = Some(needle.to_string());
    }

    pub fn fail_deletes_containing(&self, needle: &str) {
        *self.fail_delete_containing.lock().unwrap() = Some(needle.to_string());
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn put_log(&self) -> Vec<String> {
        self.puts.lock().unwrap().clone()
    }

    pub fn delete_log(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    fn should_fail(needle: &Mutex<Option<String>>, key: &str) -> bool {
        needle
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|n| key.contains(n))
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn put(&self, key: &str, body: ObjectBody, content_type: &str) -> StorageResult<String> {
        self.puts.lock().unwrap().push(key.to_string());
        if Self::should_fail(&self.fail_put_containing, key) {
            return Err(StorageError::UploadFailed(format!("injected failure for {key}")));
        }

        let data = match body {
            ObjectBody::Bytes(bytes) => bytes,
            ObjectBody::File(path) => Bytes::from(tokio::fs::read(&path).await?),
        };
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(self.public_url(key))
    }

    async fn download(&self, key: &str) -> StorageResult<Bytes> {
        self.object(key)
            .map(|(data, _)| data)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<bool> {
        self.deletes.lock().unwrap().push(key.to_string());
        if Self::should_fail(&self.fail_delete_containing, key) {
            return Err(StorageError::DeleteFailed(format!("injected failure for {key}")));
        }
        Ok(self.objects.lock().unwrap().remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{BASE_URL}/{key}")
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Transformer that tags its input with the target width.
#[derive(Default)]
pub struct StubTransformer {
    calls: AtomicUsize,
    fail_width: Option<u32>,
    delay: Option<Duration>,
}

impl StubTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(width: u32) -> Self {
        Self {
            fail_width: Some(width),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VariantTransformer for StubTransformer {
    async fn transform(
        &self,
        source: Bytes,
        _format: ImageFormatKind,
        resize: &ResizeOptions,
        _preset: &FormatPreset,
    ) -> Result<Bytes, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let width = resize.width.unwrap_or_default();
        if self.fail_width == Some(width) {
            return Err(TransformError::Encode(format!("cannot encode width {width}")));
        }
        let mut out = format!("w{width}:").into_bytes();
        out.extend_from_slice(&source);
        Ok(Bytes::from(out))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

pub fn catalog() -> Vec<SizeSpec> {
    vec![
        SizeSpec::new("thumb", ResizeOptions::new(Some(100), None)),
        SizeSpec::new("medium", ResizeOptions::new(Some(500), None)),
    ]
}

pub fn config(scratch: &Path, sizes: Vec<SizeSpec>, mode: StagingMode) -> Config {
    Config::new(PipelineConfig {
        scratch_dir: scratch.to_path_buf(),
        staging_mode: mode,
        image_sizes: sizes,
        ..Default::default()
    })
}

pub async fn provider(
    storage: Arc<RecordingStorage>,
    transformer: Arc<StubTransformer>,
    config: Config,
) -> MediaProvider {
    MediaProvider::new(storage, transformer, config)
        .await
        .expect("provider")
}

/// Files left in the scratch directory.
pub fn scratch_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

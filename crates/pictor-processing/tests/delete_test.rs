mod helpers;

use bytes::Bytes;
use helpers::{catalog, config, provider, RecordingStorage, StubTransformer};
use pictor_core::{AssetDescriptor, ResizeOptions, SizeSpec, StagingMode};
use pictor_processing::{KeyOutcome, PipelineError, UploadOptions};
use std::sync::Arc;
use tempfile::tempdir;

/// Simulates the host persisting an asset record and handing it back later.
fn persisted(uploaded: &AssetDescriptor) -> AssetDescriptor {
    let mut record = AssetDescriptor::new(&uploaded.hash, &uploaded.ext, &uploaded.mime);
    record.provider_metadata = uploaded.provider_metadata.clone();
    record.url = uploaded.url.clone();
    record
}

#[tokio::test]
async fn delete_removes_exactly_what_upload_stored() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::new());
    let provider = provider(
        storage.clone(),
        Arc::new(StubTransformer::new()),
        config(dir.path(), catalog(), StagingMode::Disk),
    )
    .await;

    let mut descriptor = AssetDescriptor::new("a1", ".jpg", "image/jpeg")
        .with_buffer(Bytes::from_static(b"jpeg"))
        .with_path(r#"{"upload_path":"tenants/7","imageSizes":"thumb"}"#);
    provider
        .upload(&mut descriptor, UploadOptions::default())
        .await
        .unwrap();
    let mut stored = storage.keys();
    stored.sort();

    let record = persisted(&descriptor);
    let mut planned = provider.plan_keys(&record).unwrap();
    planned.sort();
    assert_eq!(planned, stored);

    let report = provider.delete(&record).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.removed(), 2);
    assert!(storage.keys().is_empty());
}

#[tokio::test]
async fn odd_customization_still_deletes_what_was_stored() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::new());
    let mut sizes = catalog();
    sizes.push(SizeSpec::new("sm", ResizeOptions::new(Some(50), None)));
    sizes.push(SizeSpec::new("2x", ResizeOptions::new(Some(200), None)));
    let provider = provider(
        storage.clone(),
        Arc::new(StubTransformer::new()),
        config(dir.path(), sizes, StagingMode::Disk),
    )
    .await;

    let cases = [
        r#"{"upload_path":"u1","imageSizes":","}"#,
        r#"{"upload_path":"u1","imageSizes":""}"#,
        r#"{"imageSizes":"   "}"#,
        r#"{"imageSizes":[""]}"#,
        r#"{"imageSizes":["sm,2x"]}"#,
        r#"{"imageSizes":["thumb", "sm,2x"]}"#,
        r#"{"imageSizes":"unknown, thumb"}"#,
        r#"{"imageSizes":"unknown"}"#,
        r#"{"upload_path":"u1/","imageSizes":"medium"}"#,
        r#"{"upload_path":"/u1/nested/"}"#,
        r#"{"upload_path":"../escape","imageSizes":"thumb"}"#,
        r#"{"upload_path":"a//b"}"#,
        r#"{"upload_path":"  "}"#,
        "not json",
    ];

    for (index, raw) in cases.iter().enumerate() {
        let mut descriptor = AssetDescriptor::new(format!("a{index}"), ".jpg", "image/jpeg")
            .with_buffer(Bytes::from_static(b"jpeg"))
            .with_path(*raw);
        let report = provider
            .upload(&mut descriptor, UploadOptions::default())
            .await
            .unwrap();
        let mut uploaded: Vec<String> = report.keys().into_iter().map(String::from).collect();
        uploaded.sort();

        let record = persisted(&descriptor);
        let mut planned = provider.plan_keys(&record).unwrap();
        planned.sort();
        assert_eq!(planned, uploaded, "key sets differ for {raw}");

        let deleted = provider.delete(&record).await.unwrap();
        assert!(deleted.is_complete(), "incomplete delete for {raw}");
        assert_eq!(deleted.removed(), uploaded.len(), "removed count for {raw}");
        assert!(storage.keys().is_empty(), "left in store for {raw}: {:?}", storage.keys());
    }
}

#[tokio::test]
async fn empty_size_list_stores_every_size() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::new());
    let provider = provider(
        storage.clone(),
        Arc::new(StubTransformer::new()),
        config(dir.path(), catalog(), StagingMode::Disk),
    )
    .await;

    let mut descriptor = AssetDescriptor::new("a1", ".jpg", "image/jpeg")
        .with_buffer(Bytes::from_static(b"jpeg"))
        .with_path(r#"{"upload_path":"u1","imageSizes":","}"#);
    let report = provider
        .upload(&mut descriptor, UploadOptions::default())
        .await
        .unwrap();

    assert_eq!(
        report.keys(),
        vec![
            "u1/original/a1_original.jpg",
            "u1/thumb/a1_thumb.jpg",
            "u1/medium/a1_medium.jpg"
        ]
    );
    assert_eq!(
        descriptor.provider_metadata,
        Some(serde_json::json!({"upload_path": "u1"}))
    );
}

#[tokio::test]
async fn deleting_twice_is_not_an_error() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::new());
    let provider = provider(
        storage.clone(),
        Arc::new(StubTransformer::new()),
        config(dir.path(), catalog(), StagingMode::Buffer),
    )
    .await;

    let mut descriptor =
        AssetDescriptor::new("a1", ".png", "image/png").with_buffer(Bytes::from_static(b"png"));
    provider
        .upload(&mut descriptor, UploadOptions::default())
        .await
        .unwrap();

    let record = persisted(&descriptor);
    provider.delete(&record).await.unwrap();
    let again = provider.delete(&record).await.unwrap();

    assert!(again.is_complete());
    assert_eq!(again.entries.len(), 3);
    assert!(again
        .entries
        .iter()
        .all(|entry| entry.outcome == KeyOutcome::Missing));
}

#[tokio::test]
async fn store_failures_are_reported_not_raised() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::new());
    let provider = provider(
        storage.clone(),
        Arc::new(StubTransformer::new()),
        config(dir.path(), catalog(), StagingMode::Disk),
    )
    .await;

    let mut descriptor =
        AssetDescriptor::new("a1", ".jpg", "image/jpeg").with_buffer(Bytes::from_static(b"jpeg"));
    provider
        .upload(&mut descriptor, UploadOptions::default())
        .await
        .unwrap();

    storage.fail_deletes_containing("medium");
    let report = provider.delete(&persisted(&descriptor)).await.unwrap();

    assert!(!report.is_complete());
    let failed: Vec<&str> = report.failed().map(|entry| entry.key.as_str()).collect();
    assert_eq!(failed, vec!["medium/a1_medium.jpg"]);
    assert_eq!(report.removed(), 2);
    assert_eq!(storage.keys(), vec!["medium/a1_medium.jpg"]);
}

#[tokio::test]
async fn malformed_metadata_falls_back_to_default_keys() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(RecordingStorage::new());
    let provider = provider(
        storage.clone(),
        Arc::new(StubTransformer::new()),
        config(dir.path(), catalog(), StagingMode::Disk),
    )
    .await;

    let record = AssetDescriptor::new("doc1", ".pdf", "application/pdf")
        .with_provider_metadata(serde_json::json!("not json at all"));
    let report = provider.delete(&record).await.unwrap();

    assert_eq!(report.keys(), vec!["file/doc1_file.pdf"]);
    assert_eq!(storage.delete_log(), vec!["file/doc1_file.pdf"]);
}

#[tokio::test]
async fn unusable_descriptor_is_the_only_error() {
    let dir = tempdir().unwrap();
    let provider = provider(
        Arc::new(RecordingStorage::new()),
        Arc::new(StubTransformer::new()),
        config(dir.path(), catalog(), StagingMode::Disk),
    )
    .await;

    let err = provider
        .delete(&AssetDescriptor::new("../a1", ".jpg", "image/jpeg"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Classification(_)));
}

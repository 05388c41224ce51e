//! Helpers shared by the `pictor` binary.

use pictor_core::constants::{METADATA_IMAGE_SIZES, METADATA_UPLOAD_PATH};
use pictor_core::ImageFormatKind;
use std::path::Path;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Best-effort content type for a file extension (with leading dot).
pub fn mime_for_extension(ext: &str) -> &'static str {
    if let Some(format) = ImageFormatKind::from_extension(ext) {
        return format.mime_type();
    }
    match ext.to_lowercase().as_str() {
        ".svg" => "image/svg+xml",
        ".pdf" => "application/pdf",
        ".txt" => "text/plain",
        ".json" => "application/json",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// `.ext` of a path, or empty.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Upload metadata in the shape hosts send it.
pub fn build_metadata(custom_path: Option<&str>, sizes: &[String]) -> Option<String> {
    if custom_path.is_none() && sizes.is_empty() {
        return None;
    }
    let mut map = serde_json::Map::new();
    if let Some(path) = custom_path {
        map.insert(METADATA_UPLOAD_PATH.to_string(), path.into());
    }
    if !sizes.is_empty() {
        map.insert(METADATA_IMAGE_SIZES.to_string(), sizes.join(",").into());
    }
    Some(serde_json::Value::Object(map).to_string())
}

/// Hash for a file when none is given: sanitized stem plus a short random suffix.
pub fn default_hash(path: &Path) -> String {
    let stem: String = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &suffix[..8];
    if stem.is_empty() {
        suffix.to_string()
    } else {
        format!("{}_{}", stem, suffix)
    }
}

//! Asset classification.

use crate::error::{PipelineError, PipelineResult};
use pictor_core::constants::{ICON_EXTENSIONS, IMAGE_EXTENSIONS, THUMBNAIL_PREFIX};
use pictor_core::{AssetDescriptor, AssetFormat, AssetType, Classification};

/// Classify an asset by hash naming convention and extension.
pub fn classify(descriptor: &AssetDescriptor) -> Classification {
    Classification {
        asset_type: asset_type(&descriptor.hash),
        format: asset_format(&descriptor.ext),
    }
}

pub fn asset_type(hash: &str) -> AssetType {
    match hash.split('_').next() {
        Some(THUMBNAIL_PREFIX) => AssetType::Thumbnail,
        _ => AssetType::Origin,
    }
}

pub fn asset_format(ext: &str) -> AssetFormat {
    let ext = ext.to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        AssetFormat::Image
    } else if ICON_EXTENSIONS.contains(&ext.as_str()) {
        AssetFormat::Icon
    } else {
        AssetFormat::File
    }
}

/// Reject descriptors whose fields cannot produce safe keys and scratch names.
pub fn validate_descriptor(
    descriptor: &AssetDescriptor,
    require_source: bool,
) -> PipelineResult<Classification> {
    let hash = descriptor.hash.as_str();
    if hash.is_empty() {
        return Err(PipelineError::Classification("hash is empty".to_string()));
    }
    if hash.contains('/') || hash.contains('\\') || hash.contains("..") {
        return Err(PipelineError::Classification(format!(
            "hash '{}' is not a single path segment",
            hash
        )));
    }

    let ext = descriptor.ext.as_str();
    if !ext.is_empty() && (!ext.starts_with('.') || ext.contains('/') || ext.contains('\\')) {
        return Err(PipelineError::Classification(format!(
            "extension '{}' must start with '.' and contain no separators",
            ext
        )));
    }

    if require_source && descriptor.source.is_none() {
        return Err(PipelineError::Classification(format!(
            "asset '{}' has no content",
            hash
        )));
    }

    Ok(classify(descriptor))
}

//! Shared key generation for storage backends.
//!
//! Upload, delete and rollback all go through [`resolve_key`], so an asset's
//! keys are derived by exactly one rule.

use crate::traits::{StorageError, StorageResult};

/// Resolve the storage key for an asset.
///
/// Empty strings count as absent.
///
/// 1. custom path and variant path: `{custom}/{variant}`
/// 2. variant path only: `{variant}`
/// 3. custom path only: `{custom}/{hash}{ext}`
/// 4. neither: `{hash}{ext}`
pub fn resolve_key(
    custom_path: Option<&str>,
    variant_path: Option<&str>,
    hash: &str,
    ext: &str,
) -> String {
    let custom = custom_path.filter(|s| !s.is_empty());
    let variant = variant_path.filter(|s| !s.is_empty());
    match (custom, variant) {
        (Some(custom), Some(variant)) => format!("{}/{}", custom, variant),
        (None, Some(variant)) => variant.to_string(),
        (Some(custom), None) => format!("{}/{}{}", custom, hash, ext),
        (None, None) => format!("{}{}", hash, ext),
    }
}

/// `{segment}/{hash}_{segment}{ext}`
pub fn variant_path(segment: &str, hash: &str, ext: &str) -> String {
    format!("{}/{}_{}{}", segment, hash, segment, ext)
}

/// Join a base endpoint and a key.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

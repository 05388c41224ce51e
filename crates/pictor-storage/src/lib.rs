//! Pictor Storage Library
//!
//! This crate provides the storage abstraction used by the upload pipeline,
//! with implementations for S3-compatible object stores and the local
//! filesystem.
//!
//! # Storage key format
//!
//! Every backend stores objects under keys produced by [`keys::resolve_key`]:
//!
//! - **Variant with custom path**: `{custom}/{variant}`
//! - **Variant only**: `{variant}` (e.g. `original/{hash}_original{ext}`)
//! - **Custom path only**: `{custom}/{hash}{ext}`
//! - **Neither**: `{hash}{ext}`
//!
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use pictor_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectBody, Storage, StorageError, StorageResult};

//! Pictor Core Library
//!
//! This crate provides the domain models, configuration and error metadata
//! shared by the storage, processing and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, PipelineConfig, SizeSelection, StagingMode, TransformBackend};
pub use error::{ConfigError, ErrorMetadata, LogLevel};
pub use models::{
    AssetDescriptor, AssetFormat, AssetSource, AssetType, Classification, Customization, Fit,
    FormatPreset, ImageFormatKind, OptimizeOptions, QualityPreset, ResizeOptions, SizeSpec,
    VariantDescriptor, VariantKind,
};
pub use storage_types::StorageBackend;

//! Pipeline error types.

use pictor_core::{ConfigError, ErrorMetadata, LogLevel};
use pictor_storage::StorageError;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure while producing one size variant.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Converter exited with status {status}: {stderr}")]
    Command { status: String, stderr: String },

    #[error("Transformer backend not available: {0}")]
    Unavailable(String),

    #[error("Transform IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Transform task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unrecognized asset: {0}")]
    Classification(String),

    #[error("Failed to stage {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read asset source: {0}")]
    SourceRead(#[source] io::Error),

    #[error("Transform failed for size '{size}': {source}")]
    Transform {
        size: String,
        #[source]
        source: TransformError,
    },

    #[error(transparent)]
    Store(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Request exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Pipeline task failed: {0}")]
    TaskJoin(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            PipelineError::Classification(_) => "ASSET_UNRECOGNIZED",
            PipelineError::Staging { .. } | PipelineError::SourceRead(_) => "STAGING_FAILED",
            PipelineError::Transform { .. } => "TRANSFORM_FAILED",
            PipelineError::Store(e) => e.error_code(),
            PipelineError::Config(e) => e.error_code(),
            PipelineError::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
            PipelineError::TaskJoin(_) => "TASK_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            PipelineError::Classification(_) | PipelineError::Config(_) => false,
            PipelineError::Transform { source, .. } => {
                matches!(source, TransformError::Io(_) | TransformError::Task(_))
            }
            PipelineError::Store(e) => e.is_recoverable(),
            _ => true,
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            PipelineError::Classification(_) => LogLevel::Debug,
            PipelineError::DeadlineExceeded(_) => LogLevel::Warn,
            PipelineError::Store(e) => e.log_level(),
            _ => LogLevel::Error,
        }
    }
}

//! Error types module
//!
//! Errors across the Pictor crates self-describe through [`ErrorMetadata`] so
//! hosts can log and classify them consistently. [`ConfigError`] is only ever
//! raised while loading or validating configuration.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like malformed input
    Debug,
    /// Warning level - for recoverable issues like a flaky backend
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be reported
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "STORE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the request can be retried as-is)
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Invalid size catalog: {0}")]
    SizeCatalog(String),

    #[error("Scratch directory {path} is not usable: {reason}")]
    Scratch { path: String, reason: String },
}

impl ErrorMetadata for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Missing(_) => "CONFIG_MISSING",
            ConfigError::Invalid { .. } => "CONFIG_INVALID",
            ConfigError::SizeCatalog(_) => "CONFIG_SIZE_CATALOG",
            ConfigError::Scratch { .. } => "CONFIG_SCRATCH_DIR",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}

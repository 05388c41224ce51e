//! Configuration module
//!
//! Process-wide pipeline settings: storage backend and credentials, scratch
//! root, staging and transform strategy, size catalog and encoding presets.
//! Loaded once from the environment (`.env` supported) and read-only after.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{DEFAULT_MAGICK_PATH, DEFAULT_MAX_CONCURRENT_TRANSFORMS, DEFAULT_SCRATCH_DIR};
use crate::error::ConfigError;
use crate::models::{validate_catalog, OptimizeOptions, SizeSpec};
use crate::storage_types::StorageBackend;

/// Where staged payloads live between intake and upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StagingMode {
    /// Scratch files under the scratch root; uploads stream from disk.
    #[default]
    Disk,
    /// Everything stays in memory; no scratch files are created.
    Buffer,
}

impl FromStr for StagingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disk" => Ok(StagingMode::Disk),
            "buffer" | "memory" => Ok(StagingMode::Buffer),
            _ => Err(anyhow::anyhow!("Invalid staging mode: {}", s)),
        }
    }
}

impl Display for StagingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StagingMode::Disk => write!(f, "disk"),
            StagingMode::Buffer => write!(f, "buffer"),
        }
    }
}

/// Which image transformer produces size variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformBackend {
    /// In-process decoding and encoding.
    #[default]
    Library,
    /// External ImageMagick binary.
    Magick,
}

impl FromStr for TransformBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "library" | "image" => Ok(TransformBackend::Library),
            "magick" | "imagemagick" => Ok(TransformBackend::Magick),
            _ => Err(anyhow::anyhow!("Invalid transform backend: {}", s)),
        }
    }
}

impl Display for TransformBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TransformBackend::Library => write!(f, "library"),
            TransformBackend::Magick => write!(f, "magick"),
        }
    }
}

/// Which sizes to produce when the upload names none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeSelection {
    /// Every catalog entry.
    #[default]
    AllWhenUnspecified,
    /// Only the original.
    NoneWhenUnspecified,
}

impl FromStr for SizeSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SizeSelection::AllWhenUnspecified),
            "none" => Ok(SizeSelection::NoneWhenUnspecified),
            _ => Err(anyhow::anyhow!("Invalid size selection: {}", s)),
        }
    }
}

/// Pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub environment: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Staging and transforms
    pub scratch_dir: PathBuf,
    pub staging_mode: StagingMode,
    pub transform_backend: TransformBackend,
    pub magick_path: String,
    pub max_concurrent_transforms: usize,
    pub image_sizes: Vec<SizeSpec>,
    pub optimize: OptimizeOptions,
    pub size_selection: SizeSelection,
    /// Default per-request deadline. `None` means no deadline.
    pub request_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            storage_backend: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            staging_mode: StagingMode::default(),
            transform_backend: TransformBackend::default(),
            magick_path: DEFAULT_MAGICK_PATH.to_string(),
            max_concurrent_transforms: DEFAULT_MAX_CONCURRENT_TRANSFORMS,
            image_sizes: Vec::new(),
            optimize: OptimizeOptions::default(),
            size_selection: SizeSelection::default(),
            request_timeout: None,
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    parse_var(name, env_opt(name).as_deref(), default)
}

/// Unset means `default`; anything unparseable is an error.
fn parse_var<T>(name: &'static str, raw: Option<&str>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        const REQUEST_TIMEOUT_SECS: u64 = 0;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = match env_opt("STORAGE_BACKEND") {
            Some(raw) => Some(raw.parse::<StorageBackend>().map_err(|e| {
                ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let image_sizes = match env_opt("IMAGE_SIZES") {
            Some(raw) => crate::models::parse_catalog(&raw)?,
            None => Vec::new(),
        };

        let optimize = match env_opt("OPTIMIZE_OPTIONS") {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
                var: "OPTIMIZE_OPTIONS",
                reason: e.to_string(),
            })?,
            None => OptimizeOptions::default(),
        };

        let max_concurrent_transforms =
            env_parse("MAX_CONCURRENT_TRANSFORMS", DEFAULT_MAX_CONCURRENT_TRANSFORMS)?;
        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            environment,
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            aws_region: env_opt("AWS_REGION"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            scratch_dir: env_opt("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRATCH_DIR)),
            staging_mode: env_parse("STAGING_MODE", StagingMode::default())?,
            transform_backend: env_parse("TRANSFORM_BACKEND", TransformBackend::default())?,
            magick_path: env_opt("MAGICK_PATH").unwrap_or_else(|| DEFAULT_MAGICK_PATH.to_string()),
            max_concurrent_transforms,
            image_sizes,
            optimize,
            size_selection: env_parse("SIZE_SELECTION", SizeSelection::default())?,
            request_timeout: (request_timeout_secs > 0)
                .then(|| Duration::from_secs(request_timeout_secs)),
        })
    }

    /// Full validation, including the storage backend settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_pipeline()?;
        self.validate_storage()
    }

    /// Checks that apply regardless of how storage is provided.
    pub fn validate_pipeline(&self) -> Result<(), ConfigError> {
        if self.scratch_dir.as_os_str().is_empty() {
            return Err(ConfigError::Missing("SCRATCH_DIR"));
        }

        if self.max_concurrent_transforms == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_CONCURRENT_TRANSFORMS",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.transform_backend == TransformBackend::Magick && self.magick_path.is_empty() {
            return Err(ConfigError::Missing("MAGICK_PATH"));
        }

        validate_catalog(&self.image_sizes)?;
        Ok(())
    }

    pub fn validate_storage(&self) -> Result<(), ConfigError> {
        let backend = self.storage_backend.unwrap_or_default();
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(ConfigError::Missing("S3_BUCKET"));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(ConfigError::Missing("S3_REGION or AWS_REGION"));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(ConfigError::Missing("LOCAL_STORAGE_PATH"));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(ConfigError::Missing("LOCAL_STORAGE_BASE_URL"));
                }
            }
        }

        Ok(())
    }
}

/// Application configuration (read-only after construction).
#[derive(Clone, Debug)]
pub struct Config(pub Box<PipelineConfig>);

impl Config {
    pub fn new(config: PipelineConfig) -> Self {
        Config(Box::new(config))
    }

    fn as_pipeline(&self) -> &PipelineConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let config = PipelineConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.as_pipeline().validate()
    }

    pub fn validate_pipeline(&self) -> Result<(), ConfigError> {
        self.as_pipeline().validate_pipeline()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_pipeline().environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn environment(&self) -> &str {
        &self.as_pipeline().environment
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_pipeline().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_pipeline().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_pipeline().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_pipeline().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_pipeline().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_pipeline().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_pipeline().local_storage_base_url.as_deref()
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.as_pipeline().scratch_dir
    }

    pub fn staging_mode(&self) -> StagingMode {
        self.as_pipeline().staging_mode
    }

    pub fn transform_backend(&self) -> TransformBackend {
        self.as_pipeline().transform_backend
    }

    pub fn magick_path(&self) -> &str {
        &self.as_pipeline().magick_path
    }

    pub fn max_concurrent_transforms(&self) -> usize {
        self.as_pipeline().max_concurrent_transforms
    }

    pub fn image_sizes(&self) -> &[SizeSpec] {
        &self.as_pipeline().image_sizes
    }

    pub fn optimize(&self) -> &OptimizeOptions {
        &self.as_pipeline().optimize
    }

    pub fn size_selection(&self) -> SizeSelection {
        self.as_pipeline().size_selection
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.as_pipeline().request_timeout
    }
}

impl From<PipelineConfig> for Config {
    fn from(config: PipelineConfig) -> Self {
        Config::new(config)
    }
}

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Where variants are written. Selected by `STORAGE_BACKEND`; S3 when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Any S3-compatible object store (AWS, MinIO via `S3_ENDPOINT`).
    #[default]
    S3,
    /// A directory served under `LOCAL_STORAGE_BASE_URL`.
    Local,
}

impl StorageBackend {
    pub const ALL: [StorageBackend; 2] = [StorageBackend::S3, StorageBackend::Local];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::S3 => "s3",
            StorageBackend::Local => "local",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" | "aws" | "minio" => Ok(StorageBackend::S3),
            "local" | "fs" | "filesystem" => Ok(StorageBackend::Local),
            _ => {
                let known: Vec<&str> = Self::ALL.iter().map(|b| b.as_str()).collect();
                Err(anyhow::anyhow!(
                    "unknown storage backend '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            }
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

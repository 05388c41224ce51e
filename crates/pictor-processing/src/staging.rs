//! Intake of the incoming asset.
//!
//! In [`StagingMode::Disk`] payloads are scratch files and uploads stream
//! from disk. In [`StagingMode::Buffer`] payloads stay in memory and no
//! scratch file is ever created.

use crate::error::{PipelineError, PipelineResult};
use crate::scratch::ScratchSet;
use bytes::Bytes;
use pictor_core::{AssetSource, StagingMode};
use pictor_storage::ObjectBody;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Staged content of one variant.
#[derive(Debug, Clone)]
pub enum Payload {
    File(PathBuf),
    Memory(Bytes),
}

impl Payload {
    /// Full content, reading the scratch file if needed.
    pub async fn load(&self) -> io::Result<Bytes> {
        match self {
            Payload::File(path) => fs::read(path).await.map(Bytes::from),
            Payload::Memory(bytes) => Ok(bytes.clone()),
        }
    }

    pub fn body(&self) -> ObjectBody {
        match self {
            Payload::File(path) => ObjectBody::File(path.clone()),
            Payload::Memory(bytes) => ObjectBody::Bytes(bytes.clone()),
        }
    }

    pub fn scratch_path(&self) -> Option<&Path> {
        match self {
            Payload::File(path) => Some(path),
            Payload::Memory(_) => None,
        }
    }
}

/// Where a staged payload goes and how it is named.
#[derive(Debug, Clone, Copy)]
pub struct StageTarget<'a> {
    pub hash: &'a str,
    pub role: &'a str,
    pub ext: &'a str,
}

/// Stage the incoming source.
///
/// A stream is fully drained and flushed before this returns, so nothing
/// downstream can observe a partial file.
pub async fn stage_source(
    source: AssetSource,
    target: StageTarget<'_>,
    mode: StagingMode,
    scratch: &ScratchSet,
) -> PipelineResult<Payload> {
    match mode {
        StagingMode::Disk => {
            let path = scratch.reserve(target.hash, target.role, target.ext);
            let start = std::time::Instant::now();
            let written = match source {
                AssetSource::Buffer(bytes) => write_file(&path, &bytes).await,
                AssetSource::Stream(mut reader) => drain_to_file(&mut reader, &path).await,
            }
            .map_err(|source| PipelineError::Staging {
                path: path.clone(),
                source,
            })?;

            tracing::debug!(
                path = %path.display(),
                size_bytes = written,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Staged asset to scratch"
            );
            Ok(Payload::File(path))
        }
        StagingMode::Buffer => match source {
            AssetSource::Buffer(bytes) => Ok(Payload::Memory(bytes)),
            AssetSource::Stream(mut reader) => {
                let mut buffer = Vec::new();
                reader
                    .read_to_end(&mut buffer)
                    .await
                    .map_err(PipelineError::SourceRead)?;
                Ok(Payload::Memory(Bytes::from(buffer)))
            }
        },
    }
}

/// Stage transformer output for one size variant.
pub async fn stage_bytes(
    bytes: Bytes,
    target: StageTarget<'_>,
    mode: StagingMode,
    scratch: &ScratchSet,
) -> PipelineResult<Payload> {
    stage_source(AssetSource::Buffer(bytes), target, mode, scratch).await
}

async fn write_file(path: &Path, data: &[u8]) -> io::Result<u64> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(data.len() as u64)
}

async fn drain_to_file<R>(reader: &mut R, path: &Path) -> io::Result<u64>
where
    R: tokio::io::AsyncRead + Unpin + ?Sized,
{
    let mut file = fs::File::create(path).await?;
    let copied = tokio::io::copy(reader, &mut file).await?;
    file.sync_all().await?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratch::ScratchDir;
    use tempfile::tempdir;

    const TARGET: StageTarget<'static> = StageTarget {
        hash: "a1",
        role: "original",
        ext: ".jpg",
    };

    #[tokio::test]
    async fn disk_mode_drains_stream_to_scratch() {
        let dir = tempdir().unwrap();
        let set = ScratchSet::new(ScratchDir::ensure(dir.path()).await.unwrap());
        let source = AssetSource::from_reader(std::io::Cursor::new(b"streamed".to_vec()));

        let payload = stage_source(source, TARGET, StagingMode::Disk, &set)
            .await
            .unwrap();

        let path = payload.scratch_path().unwrap().to_path_buf();
        assert_eq!(path, dir.path().join("a1_original.jpg"));
        assert_eq!(&payload.load().await.unwrap()[..], b"streamed");
        assert_eq!(set.pending(), vec![path]);
        assert!(matches!(payload.body(), ObjectBody::File(_)));
    }

    #[tokio::test]
    async fn disk_mode_writes_buffer() {
        let dir = tempdir().unwrap();
        let set = ScratchSet::new(ScratchDir::ensure(dir.path()).await.unwrap());

        let payload = stage_bytes(Bytes::from_static(b"buf"), TARGET, StagingMode::Disk, &set)
            .await
            .unwrap();
        assert_eq!(&payload.load().await.unwrap()[..], b"buf");
    }

    #[tokio::test]
    async fn buffer_mode_creates_no_files() {
        let dir = tempdir().unwrap();
        let set = ScratchSet::new(ScratchDir::ensure(dir.path()).await.unwrap());
        let source = AssetSource::from_reader(std::io::Cursor::new(b"in memory".to_vec()));

        let payload = stage_source(source, TARGET, StagingMode::Buffer, &set)
            .await
            .unwrap();

        assert!(payload.scratch_path().is_none());
        assert_eq!(&payload.load().await.unwrap()[..], b"in memory");
        assert!(set.pending().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn staging_failure_keeps_path_registered() {
        let dir = tempdir().unwrap();
        let scratch = ScratchDir::ensure(dir.path().join("gone")).await.unwrap();
        std::fs::remove_dir(scratch.root()).unwrap();
        let set = ScratchSet::new(scratch);

        let err = stage_bytes(Bytes::from_static(b"x"), TARGET, StagingMode::Disk, &set)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Staging { .. }));
        assert_eq!(set.pending().len(), 1);
        set.cleanup().await;
    }
}

//! Scratch files used while a request is in flight.
//!
//! Every file a request writes is registered with its [`ScratchSet`] before
//! the write starts. A registered file is removed exactly once: either by
//! [`ScratchSet::discard`] after its object is stored, or by
//! [`ScratchSet::cleanup`] when the request ends.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Root directory for scratch files, shared by all requests.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Create the root if needed.
    pub async fn ensure(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/{hash}_{role}{ext}`
    pub fn path_for(&self, hash: &str, role: &str, ext: &str) -> PathBuf {
        self.root.join(format!("{}_{}{}", hash, role, ext))
    }
}

/// Files written by one request.
#[derive(Debug)]
pub struct ScratchSet {
    dir: ScratchDir,
    files: Mutex<BTreeSet<PathBuf>>,
}

impl ScratchSet {
    pub fn new(dir: ScratchDir) -> Self {
        Self {
            dir,
            files: Mutex::new(BTreeSet::new()),
        }
    }

    /// Register and return the scratch path for a variant.
    pub fn reserve(&self, hash: &str, role: &str, ext: &str) -> PathBuf {
        let path = self.dir.path_for(hash, role, ext);
        self.lock().insert(path.clone());
        path
    }

    /// Remove one file early. No-op if it was already released.
    pub async fn discard(&self, path: &Path) {
        let registered = self.lock().remove(path);
        if registered {
            remove_quietly(path).await;
        }
    }

    /// Remove every file still registered.
    pub async fn cleanup(&self) {
        let pending = std::mem::take(&mut *self.lock());
        for path in pending {
            remove_quietly(&path).await;
        }
    }

    pub fn pending(&self) -> Vec<PathBuf> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<PathBuf>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed scratch file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            error = %e,
            path = %path.display(),
            "Failed to remove scratch file"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn paths_are_namespaced_by_hash_and_role() {
        let dir = tempdir().unwrap();
        let scratch = ScratchDir::ensure(dir.path().join("temp")).await.unwrap();
        assert!(scratch.root().is_dir());
        assert_eq!(
            scratch.path_for("a1", "thumb", ".jpg"),
            dir.path().join("temp").join("a1_thumb.jpg")
        );
    }

    #[tokio::test]
    async fn discard_then_cleanup_removes_each_file_once() {
        let dir = tempdir().unwrap();
        let set = ScratchSet::new(ScratchDir::ensure(dir.path()).await.unwrap());

        let original = set.reserve("a1", "original", ".jpg");
        let thumb = set.reserve("a1", "thumb", ".jpg");
        tokio::fs::write(&original, b"o").await.unwrap();
        tokio::fs::write(&thumb, b"t").await.unwrap();

        set.discard(&original).await;
        assert!(!original.exists());
        assert_eq!(set.pending(), vec![thumb.clone()]);

        // A second discard is a no-op even if something recreated the file.
        tokio::fs::write(&original, b"o2").await.unwrap();
        set.discard(&original).await;
        assert!(original.exists());

        set.cleanup().await;
        assert!(!thumb.exists());
        assert!(set.pending().is_empty());
    }

    #[tokio::test]
    async fn cleanup_tolerates_files_never_written() {
        let dir = tempdir().unwrap();
        let set = ScratchSet::new(ScratchDir::ensure(dir.path()).await.unwrap());
        set.reserve("a1", "large", ".png");
        set.cleanup().await;
        assert!(set.pending().is_empty());
    }
}

//! Blob persistence abstraction.
//!
//! The [`BlobStore`] trait is the only way the record stores touch their
//! backing data: whole blobs are read and written by location. The
//! filesystem implementation backs the real service; [`MemoryBlobStore`]
//! keeps everything in a `HashMap` for tests.
//!
//! Implementations must be `Send + Sync` to be shared across request
//! handlers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Byte-level key-value store addressed by location.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the blob at `location`, or `None` if nothing was ever written.
    async fn read(&self, location: &Path) -> Result<Option<Vec<u8>>>;

    /// Replaces the blob at `location` with `bytes`.
    async fn write(&self, location: &Path, bytes: &[u8]) -> Result<()>;
}

/// Stores each blob as a file; the location is the file path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBlobStore;

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn read(&self, location: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(location).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read {}", location.display()))
            }
        }
    }

    async fn write(&self, location: &Path, bytes: &[u8]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = location.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
        }
        tokio::fs::write(location, bytes)
            .await
            .with_context(|| format!("Failed to write {}", location.display()))
    }
}

/// In-memory blob store for tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes currently held at `location`.
    pub fn get(&self, location: &Path) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .ok()
            .and_then(|blobs| blobs.get(location).cloned())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, location: &Path) -> Result<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| anyhow::anyhow!("blob store lock poisoned"))?;
        Ok(blobs.get(location).cloned())
    }

    async fn write(&self, location: &Path, bytes: &[u8]) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| anyhow::anyhow!("blob store lock poisoned"))?;
        blobs.insert(location.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_missing_file_reads_none() {
        let tmp = TempDir::new().unwrap();
        let got = FsBlobStore.read(&tmp.path().join("absent.json")).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn test_fs_write_creates_parent_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/store.json");

        FsBlobStore.write(&path, b"first").await.unwrap();
        FsBlobStore.write(&path, b"second").await.unwrap();

        let got = FsBlobStore.read(&path).await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"second"[..]));
    }

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let blobs = MemoryBlobStore::new();
        let loc = Path::new("docs.json");
        assert!(blobs.read(loc).await.unwrap().is_none());

        blobs.write(loc, b"[]").await.unwrap();
        assert_eq!(blobs.get(loc).as_deref(), Some(&b"[]"[..]));
    }
}

//! Typed JSON record store.
//!
//! A [`RecordStore`] holds a list of records as a single pretty-printed JSON
//! array at one blob location. Reads never fail: a missing, unreadable, or
//! undecodable blob yields an empty collection. Writes replace the whole
//! blob.
//!
//! Load-mutate-save sequences go through [`RecordStore::update`], which
//! holds the store's write lock for the full cycle so concurrent ingestions
//! cannot overwrite each other's contribution.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::blob::BlobStore;

pub struct RecordStore<T> {
    blobs: Arc<dyn BlobStore>,
    location: PathBuf,
    lock: RwLock<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> RecordStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(blobs: Arc<dyn BlobStore>, location: impl Into<PathBuf>) -> Self {
        Self {
            blobs,
            location: location.into(),
            lock: RwLock::new(()),
            _records: PhantomData,
        }
    }

    /// Loads all records without taking the lock.
    ///
    /// Any read or decode failure is logged and mapped to an empty list.
    pub async fn load(&self) -> Vec<T> {
        let bytes = match self.blobs.read(&self.location).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(location = %self.location.display(), error = %e, "store unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(location = %self.location.display(), error = %e, "store corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Serializes `records` and overwrites the blob.
    pub async fn save(&self, records: &[T]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(records).context("Failed to encode records")?;
        self.blobs
            .write(&self.location, &bytes)
            .await
            .with_context(|| format!("Failed to save store {}", self.location.display()))?;
        debug!(location = %self.location.display(), records = records.len(), "store saved");
        Ok(())
    }

    /// Loads all records under the shared lock.
    pub async fn read(&self) -> Vec<T> {
        let _guard = self.lock.read().await;
        self.load().await
    }

    /// Runs one exclusive load-mutate-save transaction.
    ///
    /// `mutate` sees the full loaded collection; whatever it leaves behind is
    /// saved. The lock is released when this returns, on success or error.
    pub async fn update<F, R>(&self, mutate: F) -> Result<(R, usize)>
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let _guard = self.lock.write().await;
        let mut records = self.load().await;
        let out = mutate(&mut records);
        self.save(&records).await?;
        Ok((out, records.len()))
    }
}

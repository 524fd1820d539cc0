//! Append-only document index.
//!
//! Documents are plain `{text, source}` records with no id. Ingestion
//! appends after everything already stored, in input order, without
//! deduplication. Queries rank documents by keyword overlap.

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::blob::BlobStore;
use crate::models::{Document, IngestSummary, NewDocument};
use crate::scoring;
use crate::store::RecordStore;

pub struct DocumentIndex {
    store: RecordStore<Document>,
}

impl DocumentIndex {
    pub fn new(blobs: Arc<dyn BlobStore>, location: impl Into<PathBuf>) -> Self {
        Self {
            store: RecordStore::new(blobs, location),
        }
    }

    /// Appends `docs` to the store and saves the full collection once.
    pub async fn ingest(&self, docs: Vec<NewDocument>) -> Result<IngestSummary> {
        let ingested = docs.len();
        let ((), total) = self
            .store
            .update(|stored| {
                stored.extend(docs.into_iter().map(NewDocument::into_document));
            })
            .await?;

        info!(ingested, total, "documents ingested");
        Ok(IngestSummary { ingested, total })
    }

    /// Ranks stored documents against a raw query string.
    pub async fn query(&self, query: &str, top_k: usize) -> Vec<(usize, Document)> {
        self.search(&scoring::query_words(query), top_k).await
    }

    /// Ranks stored documents against an already extracted word set.
    pub async fn search(&self, words: &BTreeSet<String>, top_k: usize) -> Vec<(usize, Document)> {
        if words.is_empty() {
            return Vec::new();
        }
        let docs = self.store.read().await;
        scoring::rank(docs, words, top_k, |d| d.text.clone())
    }

    /// Number of stored documents.
    pub async fn count(&self) -> usize {
        self.store.read().await.len()
    }
}

//! Project metadata index.
//!
//! Projects are keyed by `id` and merged with upsert semantics: an incoming
//! record replaces the stored one with the same id in place, and unseen ids
//! are appended in input order. Later duplicates in a batch win.
//!
//! The store holds raw JSON records and each one is decoded on its own. A
//! stored record that no longer decodes as a [`Project`] is skipped by reads
//! and kept as-is by writes.
//!
//! Projects can be ingested directly or pulled from an
//! [`AllowlistSource`]. Queries score each project over its name,
//! description and tags.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::allowlist::{parse_projects, AllowlistError, AllowlistSource};
use crate::blob::BlobStore;
use crate::models::{AllowlistSummary, IngestSummary, Project, ALLOWLIST_SOURCE};
use crate::scoring;
use crate::store::RecordStore;

pub struct ProjectIndex {
    store: RecordStore<Value>,
}

impl ProjectIndex {
    pub fn new(blobs: Arc<dyn BlobStore>, location: impl Into<PathBuf>) -> Self {
        Self {
            store: RecordStore::new(blobs, location),
        }
    }

    /// Upserts `projects` by id and saves the merged collection.
    pub async fn ingest(&self, projects: Vec<Project>) -> Result<IngestSummary> {
        let ingested = projects.len();
        let incoming = projects
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to encode projects")?;

        let ((), total) = self
            .store
            .update(|stored| {
                let existing = std::mem::take(stored);
                *stored = merge_by_id(existing, incoming);
            })
            .await?;

        info!(ingested, total, "projects ingested");
        Ok(IngestSummary { ingested, total })
    }

    /// Reads, validates and upserts every record from `source`.
    ///
    /// Any failure leaves the store untouched and comes back as an
    /// [`AllowlistError`].
    pub async fn ingest_from_allowlist(
        &self,
        source: &dyn AllowlistSource,
    ) -> Result<AllowlistSummary, AllowlistError> {
        let projects = source.read().await.and_then(parse_projects);
        let projects = match projects {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "allowlist rejected");
                return Err(e);
            }
        };

        let summary = self.ingest(projects).await.map_err(|e| {
            warn!(error = %e, "allowlist ingestion failed");
            AllowlistError::failed(format!("{:#}", e))
        })?;

        Ok(AllowlistSummary {
            source: ALLOWLIST_SOURCE.to_string(),
            ingested: summary.ingested,
            total: summary.total,
        })
    }

    /// Ranks stored projects against a raw query string.
    pub async fn query(&self, query: &str, top_k: usize) -> Vec<(usize, Project)> {
        self.search(&scoring::query_words(query), top_k).await
    }

    /// Ranks stored projects against an already extracted word set.
    pub async fn search(&self, words: &BTreeSet<String>, top_k: usize) -> Vec<(usize, Project)> {
        if words.is_empty() {
            return Vec::new();
        }
        scoring::rank(self.list().await, words, top_k, haystack)
    }

    /// All decodable stored projects, in store order.
    pub async fn list(&self) -> Vec<Project> {
        decode_all(self.store.read().await)
    }

    /// Looks up a project by id.
    pub async fn get(&self, project_id: &str) -> Option<Project> {
        self.list().await.into_iter().find(|p| p.id == project_id)
    }
}

/// Decodes stored records, skipping the ones that are not valid projects.
fn decode_all(records: Vec<Value>) -> Vec<Project> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match serde_json::from_value(record) {
            Ok(project) => Some(project),
            Err(e) => {
                warn!(record = i, error = %e, "skipping undecodable project record");
                None
            }
        })
        .collect()
}

/// Searchable text of a project: name, description and space-joined tags.
fn haystack(project: &Project) -> String {
    format!(
        "{} {} {}",
        project.name,
        project.description.as_deref().unwrap_or(""),
        project.tags.join(" ")
    )
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Upserts `incoming` into `existing`, keyed by id.
///
/// Existing ids keep their relative order; new ids follow in the order they
/// were first seen. Records without a string id are never merged.
fn merge_by_id(existing: Vec<Value>, incoming: Vec<Value>) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::with_capacity(existing.len() + incoming.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in existing.into_iter().chain(incoming) {
        let Some(id) = record_id(&record).map(str::to_string) else {
            merged.push(record);
            continue;
        };
        match positions.get(&id) {
            Some(&pos) => merged[pos] = record,
            None => {
                positions.insert(id, merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

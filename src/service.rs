//! The retrieval service: both indexes, the allowlist, and retrieval
//! settings wired together from a [`Config`].
//!
//! Shared by the HTTP server and the CLI so both surfaces run exactly the
//! same operations.

use anyhow::Result;
use std::sync::Arc;

use crate::allowlist::{AllowlistError, AllowlistSource, FileAllowlist};
use crate::blob::{BlobStore, FsBlobStore};
use crate::config::{Config, RetrievalConfig};
use crate::documents::DocumentIndex;
use crate::models::{AllowlistSummary, IngestSummary, NewDocument, Project, QueryResponse};
use crate::projects::ProjectIndex;
use crate::query::run_query;

pub struct RagService {
    documents: DocumentIndex,
    projects: ProjectIndex,
    allowlist: Arc<dyn AllowlistSource>,
    retrieval: RetrievalConfig,
}

impl RagService {
    /// Builds the service over file-backed stores at the configured paths.
    pub fn from_config(config: &Config) -> Self {
        Self::with_backends(
            config,
            Arc::new(FsBlobStore),
            Arc::new(FileAllowlist::new(&config.allowlist.path)),
        )
    }

    /// Builds the service over caller-supplied blob and allowlist backends.
    pub fn with_backends(
        config: &Config,
        blobs: Arc<dyn BlobStore>,
        allowlist: Arc<dyn AllowlistSource>,
    ) -> Self {
        Self {
            documents: DocumentIndex::new(blobs.clone(), &config.store.documents_path),
            projects: ProjectIndex::new(blobs, &config.store.projects_path),
            allowlist,
            retrieval: config.retrieval.clone(),
        }
    }

    pub async fn ingest_documents(&self, docs: Vec<NewDocument>) -> Result<IngestSummary> {
        self.documents.ingest(docs).await
    }

    pub async fn ingest_projects(&self, projects: Vec<Project>) -> Result<IngestSummary> {
        self.projects.ingest(projects).await
    }

    pub async fn ingest_allowlist(&self) -> Result<AllowlistSummary, AllowlistError> {
        self.projects
            .ingest_from_allowlist(self.allowlist.as_ref())
            .await
    }

    pub async fn list_projects(&self) -> Vec<Project> {
        self.projects.list().await
    }

    pub async fn get_project(&self, project_id: &str) -> Option<Project> {
        self.projects.get(project_id).await
    }

    /// Runs a query; `top_k` falls back to `retrieval.default_top_k`.
    pub async fn query(&self, query: &str, top_k: Option<usize>) -> QueryResponse {
        let top_k = top_k.unwrap_or(self.retrieval.default_top_k);
        run_query(
            &self.documents,
            &self.projects,
            query,
            top_k,
            self.retrieval.snippet_chars,
        )
        .await
    }
}

//! Allowlist data source for seeding the project index.
//!
//! The allowlist is a curated JSON array of project records kept outside the
//! stores. An [`AllowlistSource`] hands back the raw JSON; validating it into
//! [`Project`]s happens in [`parse_projects`].
//!
//! Every failure on this path is reported as an [`AllowlistError`] that
//! renders to a JSON error object. Nothing here is allowed to take the
//! service down.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::Project;

#[derive(Debug, Error)]
pub enum AllowlistError {
    #[error("allowlist file not found")]
    NotFound { path: PathBuf },

    #[error("allowlist must be a list")]
    NotAList,

    #[error("failed to ingest allowlist")]
    Failed { detail: String },
}

impl AllowlistError {
    pub fn failed(detail: impl ToString) -> Self {
        Self::Failed {
            detail: detail.to_string(),
        }
    }

    /// JSON error object returned to callers.
    pub fn to_json(&self) -> Value {
        match self {
            Self::NotFound { path } => json!({
                "error": self.to_string(),
                "path": path.display().to_string(),
            }),
            Self::NotAList => json!({ "error": self.to_string() }),
            Self::Failed { detail } => json!({
                "error": self.to_string(),
                "detail": detail,
            }),
        }
    }
}

/// Provider of raw allowlist records.
#[async_trait]
pub trait AllowlistSource: Send + Sync {
    /// Reads the raw allowlist document.
    async fn read(&self) -> Result<Value, AllowlistError>;
}

/// Allowlist stored as a JSON file at a fixed path.
#[derive(Debug, Clone)]
pub struct FileAllowlist {
    path: PathBuf,
}

impl FileAllowlist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AllowlistSource for FileAllowlist {
    async fn read(&self) -> Result<Value, AllowlistError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(AllowlistError::failed)?;
        if !exists {
            return Err(AllowlistError::NotFound {
                path: self.path.clone(),
            });
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(AllowlistError::failed)?;
        serde_json::from_str(&content).map_err(AllowlistError::failed)
    }
}

/// Validates a raw allowlist document into projects.
///
/// The whole batch is rejected if any record is not a valid project.
pub fn parse_projects(raw: Value) -> Result<Vec<Project>, AllowlistError> {
    let Value::Array(records) = raw else {
        return Err(AllowlistError::NotAList);
    };

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            serde_json::from_value::<Project>(record)
                .map_err(|e| AllowlistError::failed(format!("record {}: {}", i, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data/projects_allowlist.json");
        let err = FileAllowlist::new(&path).read().await.unwrap_err();

        assert!(matches!(err, AllowlistError::NotFound { .. }));
        let body = err.to_json();
        assert_eq!(body["error"], "allowlist file not found");
        assert_eq!(body["path"], path.display().to_string());
    }

    #[tokio::test]
    async fn test_unreachable_path_is_failed_not_missing() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("plain-file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = FileAllowlist::new(blocker.join("allowlist.json"))
            .read()
            .await
            .unwrap_err();

        assert!(matches!(err, AllowlistError::Failed { .. }), "got {:?}", err);
        assert_eq!(err.to_json()["error"], "failed to ingest allowlist");
    }

    #[tokio::test]
    async fn test_malformed_json_is_failed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("allowlist.json");
        std::fs::write(&path, "[{").unwrap();

        let err = FileAllowlist::new(&path).read().await.unwrap_err();
        let body = err.to_json();
        assert_eq!(body["error"], "failed to ingest allowlist");
        assert!(body["detail"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_reads_json_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("allowlist.json");
        std::fs::write(&path, r#"[{"id": "p1", "name": "Atlas", "slug": "atlas"}]"#).unwrap();

        let raw = FileAllowlist::new(&path).read().await.unwrap();
        let projects = parse_projects(raw).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "p1");
    }

    #[test]
    fn test_parse_rejects_non_list() {
        let err = parse_projects(json!({"id": "p1"})).unwrap_err();
        assert!(matches!(err, AllowlistError::NotAList));
        assert_eq!(err.to_json(), json!({"error": "allowlist must be a list"}));
    }

    #[test]
    fn test_parse_rejects_whole_batch_on_invalid_record() {
        let raw = json!([
            {"id": "p1", "name": "Atlas", "slug": "atlas"},
            {"id": "p2", "name": "Missing slug"}
        ]);
        let err = parse_projects(raw).unwrap_err();
        let body = err.to_json();
        assert_eq!(body["error"], "failed to ingest allowlist");
        assert!(
            body["detail"].as_str().unwrap().contains("record 1"),
            "detail should name the bad record: {}",
            body
        );
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let raw = json!([{"id": "p1", "name": 42, "slug": "atlas"}]);
        assert!(matches!(
            parse_projects(raw),
            Err(AllowlistError::Failed { .. })
        ));
    }
}

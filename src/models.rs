//! Core data models used throughout the retrieval service.
//!
//! These types represent the documents and project records held by the two
//! stores, plus the request and response shapes that flow through ingestion
//! and querying.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Source label given to documents ingested without one.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Source name reported for projects that carry no `sources` entry.
pub const ALLOWLIST_SOURCE: &str = "allowlist";

/// A stored text document. Identity is its position in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

/// A document as submitted for ingestion, before the source is defaulted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewDocument {
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl NewDocument {
    /// Normalizes into a stored [`Document`]. An absent or empty source
    /// becomes `"unknown"`.
    pub fn into_document(self) -> Document {
        let source = match self.source {
            Some(s) if !s.is_empty() => s,
            _ => default_source(),
        };
        Document {
            text: self.text,
            source,
        }
    }
}

/// Request body for document ingestion.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestRequest {
    pub documents: Vec<NewDocument>,
}

/// A project metadata record, keyed by `id`.
///
/// `official_links` keeps the key order it was ingested with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub official_links: IndexMap<String, String>,
    #[serde(default)]
    pub sources: Vec<ProjectSource>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Accepts any JSON for `tags`: a non-list is empty and non-string items
/// are rendered as JSON text.
fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags)
}

/// Provenance entry attached to a project. Fields other than
/// `source_name` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Request body for `POST /query`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Result of a query: parallel `context` snippets and `sources` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub context: Vec<String>,
    pub sources: Vec<SourceRef>,
}

/// A `sources` entry. Document hits carry their plain source label,
/// project fallback hits carry a structured reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceRef {
    Label(String),
    Project(ProjectRef),
}

/// Structured source entry produced by the project fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub source_name: String,
    pub project_id: String,
    pub official_links: IndexMap<String, String>,
}

/// Outcome of a document or project ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub ingested: usize,
    pub total: usize,
}

/// Outcome of a successful allowlist ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowlistSummary {
    pub source: String,
    pub ingested: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_document_defaults_source() {
        let doc = NewDocument {
            text: "hello".into(),
            source: None,
        }
        .into_document();
        assert_eq!(doc.source, "unknown");

        let doc = NewDocument {
            text: "hello".into(),
            source: Some(String::new()),
        }
        .into_document();
        assert_eq!(doc.source, "unknown");

        let doc = NewDocument {
            text: "hello".into(),
            source: Some("wiki".into()),
        }
        .into_document();
        assert_eq!(doc.source, "wiki");
    }

    #[test]
    fn test_project_optional_fields_default() {
        let p: Project =
            serde_json::from_value(json!({"id": "p1", "name": "Atlas", "slug": "atlas"})).unwrap();
        assert_eq!(p.description, None);
        assert!(p.tags.is_empty());
        assert!(p.official_links.is_empty());
        assert!(p.sources.is_empty());
        assert_eq!(p.updated_at, None);
    }

    #[test]
    fn test_project_requires_slug() {
        let res = serde_json::from_value::<Project>(json!({"id": "p1", "name": "Atlas"}));
        assert!(res.is_err());
    }

    #[test]
    fn test_project_tags_are_lenient() {
        let p: Project = serde_json::from_value(
            json!({"id": "p1", "name": "Atlas", "slug": "atlas", "tags": "graph"}),
        )
        .unwrap();
        assert!(p.tags.is_empty());

        let p: Project = serde_json::from_value(
            json!({"id": "p1", "name": "Atlas", "slug": "atlas", "tags": ["graph", 3, true]}),
        )
        .unwrap();
        assert_eq!(p.tags, vec!["graph", "3", "true"]);

        let p: Project = serde_json::from_value(
            json!({"id": "p1", "name": "Atlas", "slug": "atlas", "tags": null}),
        )
        .unwrap();
        assert!(p.tags.is_empty());
    }

    #[test]
    fn test_official_links_keep_ingest_order() {
        let p: Project = serde_json::from_str(
            r#"{"id": "p1", "name": "Atlas", "slug": "atlas",
                "official_links": {"repo": "r", "docs": "d", "home": "h"}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = p.official_links.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["repo", "docs", "home"]);

        let text = serde_json::to_string(&p).unwrap();
        let repo = text.find("\"repo\"").unwrap();
        let home = text.find("\"home\"").unwrap();
        assert!(repo < home, "links re-sorted: {}", text);
    }

    #[test]
    fn test_project_source_keeps_extra_fields() {
        let src: ProjectSource = serde_json::from_value(
            json!({"source_name": "github", "url": "https://example.com"}),
        )
        .unwrap();
        assert_eq!(src.source_name.as_deref(), Some("github"));
        assert_eq!(src.extra["url"], "https://example.com");

        let back = serde_json::to_value(&src).unwrap();
        assert_eq!(back, json!({"source_name": "github", "url": "https://example.com"}));
    }

    #[test]
    fn test_source_ref_shapes() {
        let label = serde_json::to_value(SourceRef::Label("s1".into())).unwrap();
        assert_eq!(label, json!("s1"));

        let project = serde_json::to_value(SourceRef::Project(ProjectRef {
            source_name: "allowlist".into(),
            project_id: "p1".into(),
            official_links: IndexMap::new(),
        }))
        .unwrap();
        assert_eq!(
            project,
            json!({"source_name": "allowlist", "project_id": "p1", "official_links": {}})
        );
    }

    #[test]
    fn test_stored_document_without_source() {
        let doc: Document = serde_json::from_value(json!({"text": "abc"})).unwrap();
        assert_eq!(doc.source, "unknown");
    }
}

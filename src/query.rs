//! Query orchestration: documents first, projects as a fallback.
//!
//! 1. Rank documents. Any hit at all means the response is built from
//!    documents alone, with plain source labels.
//! 2. Otherwise, if the query has at least one usable word, rank projects
//!    and describe each hit as a readable snippet plus a structured source.
//! 3. Otherwise return an empty response.
//!
//! Document and project sources are never mixed in one response.

use crate::documents::DocumentIndex;
use crate::models::{Project, ProjectRef, QueryResponse, SourceRef, ALLOWLIST_SOURCE};
use crate::projects::ProjectIndex;
use crate::scoring;

/// Snippet head used when a project has no name.
const UNKNOWN_PROJECT: &str = "Unknown project";

/// Answers `query` from the two indexes.
pub async fn run_query(
    documents: &DocumentIndex,
    projects: &ProjectIndex,
    query: &str,
    top_k: usize,
    snippet_chars: usize,
) -> QueryResponse {
    let words = scoring::query_words(query);
    if words.is_empty() {
        return QueryResponse::default();
    }

    let doc_hits = documents.search(&words, top_k).await;
    if !doc_hits.is_empty() {
        let (context, sources) = doc_hits
            .into_iter()
            .map(|(_, doc)| {
                (
                    scoring::snippet(&doc.text, snippet_chars),
                    SourceRef::Label(doc.source),
                )
            })
            .unzip();
        return QueryResponse { context, sources };
    }

    let (context, sources) = projects
        .search(&words, top_k)
        .await
        .into_iter()
        .map(|(_, project)| {
            (
                project_snippet(&project, snippet_chars),
                SourceRef::Project(project_ref(project)),
            )
        })
        .unzip();
    QueryResponse { context, sources }
}

/// `"{name} - {description} (tags: a, b)"`, skipping empty parts.
fn project_snippet(project: &Project, snippet_chars: usize) -> String {
    let name = if project.name.is_empty() {
        UNKNOWN_PROJECT
    } else {
        project.name.as_str()
    };
    let mut parts = vec![name.to_string()];

    if let Some(desc) = project.description.as_deref().filter(|d| !d.is_empty()) {
        parts.push(format!("- {}", desc));
    }

    let tags = project.tags.join(", ");
    if !tags.is_empty() {
        parts.push(format!("(tags: {})", tags));
    }

    scoring::snippet(&parts.join(" "), snippet_chars)
}

fn project_ref(project: Project) -> ProjectRef {
    let source_name = project
        .sources
        .first()
        .and_then(|s| s.source_name.clone())
        .unwrap_or_else(|| ALLOWLIST_SOURCE.to_string());

    ProjectRef {
        source_name,
        project_id: project.id,
        official_links: project.official_links,
    }
}

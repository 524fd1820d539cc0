//! # rag CLI
//!
//! The `rag` binary runs the retrieval service over HTTP and exposes the
//! same ingestion and query operations from the command line.
//!
//! ## Usage
//!
//! ```bash
//! rag --config ./config/rag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rag serve` | Start the HTTP server |
//! | `rag ingest <file>` | Append documents from a JSON file |
//! | `rag query "<query>"` | Query documents, falling back to projects |
//! | `rag projects list` | Print all projects |
//! | `rag projects get <id>` | Print one project |
//! | `rag projects ingest <file>` | Upsert projects from a JSON file |
//! | `rag projects allowlist` | Upsert projects from the allowlist file |

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use rag_backend::config;
use rag_backend::models::{NewDocument, Project, QueryResponse, SourceRef};
use rag_backend::server;
use rag_backend::service::RagService;

/// rag: a minimal keyword-overlap retrieval service for documents and
/// project metadata.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(name = "rag", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/rag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Append documents from a JSON file.
    ///
    /// The file holds either `{"documents": [...]}` or a bare array of
    /// `{"text", "source"?}` objects.
    Ingest {
        /// Path to the JSON file.
        file: PathBuf,
    },

    /// Query stored documents, falling back to projects when nothing matches.
    Query {
        /// The query string.
        query: String,

        /// Maximum number of results (defaults to `retrieval.default_top_k`).
        #[arg(long)]
        top_k: Option<usize>,

        /// Print the raw JSON response.
        #[arg(long)]
        json: bool,
    },

    /// Manage project records.
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },
}

#[derive(Subcommand)]
enum ProjectsAction {
    /// Print all projects as JSON.
    List,
    /// Print one project as JSON.
    Get {
        /// Project id.
        id: String,
    },
    /// Upsert projects from a JSON array file.
    Ingest {
        /// Path to the JSON file.
        file: PathBuf,
    },
    /// Upsert projects from the configured allowlist file.
    Allowlist,
}

/// Accepted shapes for `rag ingest` input files.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentsFile {
    Wrapped { documents: Vec<NewDocument> },
    Bare(Vec<NewDocument>),
}

impl DocumentsFile {
    fn into_documents(self) -> Vec<NewDocument> {
        match self {
            Self::Wrapped { documents } => documents,
            Self::Bare(documents) => documents,
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_results(resp: &QueryResponse) {
    if resp.context.is_empty() {
        println!("No results.");
        return;
    }

    for (i, (snippet, source)) in resp.context.iter().zip(&resp.sources).enumerate() {
        match source {
            SourceRef::Label(label) => println!("{}. [{}]", i + 1, label),
            SourceRef::Project(p) => {
                println!("{}. [project {} via {}]", i + 1, p.project_id, p.source_name);
                for (name, url) in &p.official_links {
                    println!("    {}: {}", name, url);
                }
            }
        }
        println!("    excerpt: \"{}\"", snippet.replace('\n', " ").trim());
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    let service = RagService::from_config(&cfg);

    match cli.command {
        Commands::Serve => {
            server::serve(&cfg.server.bind, Arc::new(service)).await?;
        }
        Commands::Ingest { file } => {
            let docs = read_json::<DocumentsFile>(&file)?.into_documents();
            let summary = service.ingest_documents(docs).await?;
            println!("ingest documents");
            println!("  ingested: {}", summary.ingested);
            println!("  total: {}", summary.total);
            println!("ok");
        }
        Commands::Query { query, top_k, json } => {
            if top_k == Some(0) {
                bail!("--top-k must be >= 1");
            }
            let resp = service.query(&query, top_k).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                print_results(&resp);
            }
        }
        Commands::Projects { action } => match action {
            ProjectsAction::List => {
                let projects = service.list_projects().await;
                println!("{}", serde_json::to_string_pretty(&projects)?);
            }
            ProjectsAction::Get { id } => match service.get_project(&id).await {
                Some(project) => println!("{}", serde_json::to_string_pretty(&project)?),
                None => bail!("project not found: {}", id),
            },
            ProjectsAction::Ingest { file } => {
                let projects: Vec<Project> = read_json(&file)?;
                let summary = service.ingest_projects(projects).await?;
                println!("ingest projects");
                println!("  ingested: {}", summary.ingested);
                println!("  total: {}", summary.total);
                println!("ok");
            }
            ProjectsAction::Allowlist => match service.ingest_allowlist().await {
                Ok(summary) => {
                    println!("ingest {}", summary.source);
                    println!("  ingested: {}", summary.ingested);
                    println!("  total: {}", summary.total);
                    println!("ok");
                }
                Err(e) => bail!("{}", e.to_json()),
            },
        },
    }

    Ok(())
}

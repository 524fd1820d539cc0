use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::scoring::SNIPPET_CHARS;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub allowlist: AllowlistConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_documents_path")]
    pub documents_path: PathBuf,
    #[serde(default = "default_projects_path")]
    pub projects_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            documents_path: default_documents_path(),
            projects_path: default_projects_path(),
        }
    }
}

fn default_documents_path() -> PathBuf {
    PathBuf::from("rag_store.json")
}
fn default_projects_path() -> PathBuf {
    PathBuf::from("projects_store.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct AllowlistConfig {
    #[serde(default = "default_allowlist_path")]
    pub path: PathBuf,
}

impl Default for AllowlistConfig {
    fn default() -> Self {
        Self {
            path: default_allowlist_path(),
        }
    }
}

fn default_allowlist_path() -> PathBuf {
    PathBuf::from("data/projects_allowlist.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

fn default_top_k() -> usize {
    5
}
fn default_snippet_chars() -> usize {
    SNIPPET_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Config {
    /// Overrides store and allowlist locations from environment-style
    /// variables (`RAG_STORE_PATH`, `PROJECTS_STORE_PATH`, `ALLOWLIST_PATH`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(path) = non_empty("RAG_STORE_PATH") {
            self.store.documents_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty("PROJECTS_STORE_PATH") {
            self.store.projects_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty("ALLOWLIST_PATH") {
            self.allowlist.path = PathBuf::from(path);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.retrieval.default_top_k == 0 {
            anyhow::bail!("retrieval.default_top_k must be >= 1");
        }
        if self.retrieval.snippet_chars == 0 {
            anyhow::bail!("retrieval.snippet_chars must be >= 1");
        }
        Ok(())
    }
}

/// Loads the config file at `path`, falling back to built-in defaults when
/// the file does not exist. Process environment overrides are applied last.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;

    Ok(config)
}

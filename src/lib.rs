//! # rag-backend
//!
//! A minimal retrieval service for short text documents and project
//! metadata.
//!
//! Documents are ranked by how many distinct query words they contain. When
//! no document matches, the query falls back to the project records and
//! answers with readable project summaries instead.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌─────────────┐
//! │ BlobStore │──▶│ RecordStore  │──▶│ Document /  │
//! │ fs / mem  │   │ JSON arrays  │   │ Project idx │
//! └───────────┘   └──────────────┘   └──────┬──────┘
//!                                           ▼
//!                                    ┌─────────────┐
//!                                    │  run_query  │
//!                                    └──────┬──────┘
//!                               ┌───────────┴───────────┐
//!                               ▼                       ▼
//!                          ┌──────────┐           ┌──────────┐
//!                          │   CLI    │           │   HTTP   │
//!                          │  (rag)   │           │  (axum)  │
//!                          └──────────┘           └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`models`] | Records and request/response shapes |
//! | [`blob`] | Blob persistence backends |
//! | [`store`] | Typed JSON record store |
//! | [`scoring`] | Keyword-overlap scoring |
//! | [`documents`] | Append-only document index |
//! | [`projects`] | Upsert-merge project index |
//! | [`allowlist`] | Allowlist data source |
//! | [`query`] | Document-first query with project fallback |
//! | [`service`] | Wires the pieces together from a config |
//! | [`server`] | HTTP server |

pub mod allowlist;
pub mod blob;
pub mod config;
pub mod documents;
pub mod models;
pub mod projects;
pub mod query;
pub mod scoring;
pub mod server;
pub mod service;
pub mod store;

//! HTTP server.
//!
//! Thin JSON boundary over [`RagService`]. Handlers parse the request, call
//! the service, and serialize the result.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check |
//! | `GET`  | `/projects` | List all projects |
//! | `GET`  | `/projects/{project_id}` | Fetch one project |
//! | `POST` | `/ingest` | Append documents |
//! | `POST` | `/query` | Query documents, falling back to projects |
//! | `POST` | `/ingest/projects` | Upsert projects |
//! | `POST` | `/ingest/source/allowlist` | Upsert projects from the allowlist file |
//!
//! # Error Contract
//!
//! Request validation and storage failures use
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "top_k must be >= 1" } }
//! ```
//!
//! An unknown project id answers `404 {"error": "not found"}`. The body is
//! the same structured value older clients read from a `200`; only the
//! status now says the lookup missed. Allowlist problems are part of the
//! normal response (`200 {"error": ..., ...}`).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::models::{IngestRequest, IngestSummary, Project, QueryRequest, QueryResponse};
use crate::service::RagService;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    service: Arc<RagService>,
}

/// Starts the HTTP server on `[server].bind` with file-backed stores.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(RagService::from_config(config));
    serve(&config.server.bind, service).await
}

/// Serves `service` on `bind_addr`.
pub async fn serve(bind_addr: &str, service: Arc<RagService>) -> anyhow::Result<()> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the route table over `service`.
pub fn router(service: Arc<RagService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/projects", get(handle_list_projects))
        .route("/projects/{project_id}", get(handle_get_project))
        .route("/ingest", post(handle_ingest))
        .route("/query", post(handle_query))
        .route("/ingest/projects", post(handle_ingest_projects))
        .route("/ingest/source/allowlist", post(handle_ingest_allowlist))
        .layer(cors)
        .with_state(AppState { service })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"internal"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = %format!("{:#}", err), "request failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message: format!("{:#}", err),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ============ Projects ============

async fn handle_list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.service.list_projects().await)
}

/// Returns the project, or `404 {"error": "not found"}`.
async fn handle_get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Response {
    match state.service.get_project(&project_id).await {
        Some(project) => Json(project).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response(),
    }
}

async fn handle_ingest_projects(
    State(state): State<AppState>,
    Json(projects): Json<Vec<Project>>,
) -> Result<Json<IngestSummary>, AppError> {
    Ok(Json(state.service.ingest_projects(projects).await?))
}

/// Allowlist failures are reported in the body with a 200 status.
async fn handle_ingest_allowlist(State(state): State<AppState>) -> Response {
    match state.service.ingest_allowlist().await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => Json(e.to_json()).into_response(),
    }
}

// ============ Documents ============

async fn handle_ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestSummary>, AppError> {
    Ok(Json(state.service.ingest_documents(req.documents).await?))
}

async fn handle_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    if req.top_k == Some(0) {
        return Err(bad_request("top_k must be >= 1"));
    }
    Ok(Json(state.service.query(&req.query, req.top_k).await))
}

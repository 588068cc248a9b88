//! HTTP endpoints of the gateway:
//!   GET    /health                    liveness probe
//!   GET    /                          service description
//!   POST   /bedrock/tool-use          run a tool and publish its file
//!   GET    /projects/{project}/files  most recent files of a project
//!   DELETE /files/{*key}              delete one stored object

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::Gateway;
use crate::error::{ErrorCategory, RelayError};
use crate::types::ToolResultEnvelope;

/// Default number of files returned by the project listing.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Error body `{"detail": ...}` with a status derived from the error category.
#[derive(Debug)]
pub struct ApiError(RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.category() {
            _ if matches!(self.0, RelayError::FileNotFound(_)) => StatusCode::NOT_FOUND,
            ErrorCategory::Request => StatusCode::BAD_REQUEST,
            ErrorCategory::Upstream | ErrorCategory::Network | ErrorCategory::Timeout => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

pub fn router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(root))
        .route("/bedrock/tool-use", post(tool_use))
        .route("/projects/{project}/files", get(list_files))
        .route("/files/{*key}", delete(delete_file))
        .with_state(gateway)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "mcp-relay-gateway",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn root(State(gateway): State<Arc<Gateway>>) -> Json<Value> {
    let config = gateway.config();
    Json(json!({
        "service": "mcp-relay-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "mcp_url": config.mcp_url,
        "bucket": config.s3_bucket,
        "region": config.aws_region,
        "endpoints": {
            "tool_use": "/bedrock/tool-use",
            "health": "/health",
            "list_files": "/projects/{project}/files",
            "delete_file": "/files/{key}",
        },
    }))
}

/// Always answers 200; failures are reported inside the tool result text.
async fn tool_use(State(gateway): State<Arc<Gateway>>, body: Bytes) -> Json<ToolResultEnvelope> {
    Json(gateway.handle_tool_use(&body).await)
}

async fn list_files(
    State(gateway): State<Arc<Gateway>>,
    Path(project): Path<String>,
    Query(query): Query<ListQuery>,
) -> Json<Value> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let files = gateway.uploader().list_project_files(&project, limit).await;
    Json(json!({
        "project": project,
        "count": files.len(),
        "files": files,
    }))
}

async fn delete_file(
    State(gateway): State<Arc<Gateway>>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    gateway.uploader().delete_file(&key).await?;
    tracing::info!(key = %key, "Deleted stored file");
    Ok(Json(json!({ "deleted": key })))
}

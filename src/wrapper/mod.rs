//! Transparent proxy in front of an MCP server that publishes the files
//! generated by selected tools and rewrites their results with the link.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::RelayConfig;
use crate::error::Result;
use crate::mcp::McpClient;
use crate::storage::{ObjectStore, Uploader};
use crate::types::{ContentBlock, ToolResult};

/// Project used when the tool input names none.
pub const DEFAULT_PROJECT: &str = "auto-generated";

pub struct Wrapper {
    upstream: McpClient,
    uploader: Uploader,
    intercept: HashSet<String>,
}

impl Wrapper {
    pub fn new(config: &RelayConfig, store: Arc<dyn ObjectStore>) -> Result<Self> {
        Ok(Self {
            upstream: McpClient::upstream_from_config(config)?,
            uploader: Uploader::new(store, config),
            intercept: config.intercept_tools.iter().cloned().collect(),
        })
    }

    pub fn intercepts(&self, tool_name: &str) -> bool {
        self.intercept.contains(tool_name)
    }

    /// Forward `body` upstream and post-process the result of intercepted tools.
    pub async fn relay(&self, body: Value) -> Value {
        let tool_name = body
            .pointer("/toolUse/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        tracing::info!(tool = %tool_name, "Relaying tool call");

        let (status, mut response) = match self.upstream.forward(&body).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(tool = %tool_name, error = %e, "Upstream call failed");
                let tool_use_id = body
                    .pointer("/toolUse/toolUseId")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                let result = ToolResult::new(
                    tool_use_id,
                    vec![ContentBlock::text(format!("❌ Error in MCP S3 wrapper: {e}"))],
                );
                return serde_json::to_value(result.into_envelope())
                    .unwrap_or_else(|_| json!({ "error": e.to_string() }));
            }
        };

        if status != 200 {
            tracing::warn!(tool = %tool_name, status, "Upstream returned an error status");
            return json!({ "error": format!("MCP error: {status}") });
        }

        if self.intercepts(&tool_name) {
            let project = body
                .pointer("/toolUse/input/project_name")
                .and_then(Value::as_str)
                .filter(|p| !p.is_empty())
                .unwrap_or(DEFAULT_PROJECT);
            self.attach_uploads(&mut response, &tool_name, project).await;
        }
        response
    }

    async fn attach_uploads(&self, response: &mut Value, tool_name: &str, project: &str) {
        let Some(items) = response
            .pointer_mut("/toolResult/content")
            .and_then(Value::as_array_mut)
        else {
            return;
        };

        for item in items.iter_mut() {
            let Some(text) = item.get("text").and_then(Value::as_str) else {
                continue;
            };
            let Ok(mut result) = serde_json::from_str::<Value>(text) else {
                continue;
            };
            if result.get("status").and_then(Value::as_str) != Some("success") {
                continue;
            }
            let Some(path) = result.get("path").and_then(Value::as_str).map(str::to_string)
            else {
                continue;
            };

            match self.publish(&path, tool_name, project).await {
                Ok(url) => {
                    result["s3_url"] = json!(url);
                    result["message"] = json!(format!("Diagram generated and uploaded to S3: {url}"));
                    if let Ok(pretty) = serde_json::to_string_pretty(&result) {
                        item["text"] = Value::String(pretty);
                    }
                }
                Err(e) => tracing::error!(path = %path, error = %e, "Could not publish generated file"),
            }
        }
    }

    async fn publish(&self, path: &str, tool_name: &str, project: &str) -> Result<String> {
        let bytes = self.upstream.fetch_file(path).await?;
        let filename = path.rsplit('/').next().unwrap_or(path);
        let uploaded = self
            .uploader
            .upload(filename, bytes, Some(project), Some(tool_name))
            .await?;
        tracing::info!(key = %uploaded.key, "Published generated file");
        Ok(uploaded.url)
    }
}

pub fn router(wrapper: Arc<Wrapper>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/bedrock/tool-use", post(tool_use))
        .with_state(wrapper)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "mcp-relay-wrapper" }))
}

async fn tool_use(State(wrapper): State<Arc<Wrapper>>, Json(body): Json<Value>) -> Json<Value> {
    Json(wrapper.relay(body).await)
}

//! Shared test helpers: mock MCP replies, relay configs and HTTP plumbing.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::MockServer;

use mcp_relay::config::{RelayConfig, StorageBackend};
use mcp_relay::storage::{MemoryStore, ObjectStore};

pub const BUCKET: &str = "relay-test";
pub const REGION: &str = "eu-west-1";

/// MCP tool-use reply carrying one text block per entry.
pub fn mcp_reply(texts: &[&str]) -> Value {
    let content: Vec<Value> = texts
        .iter()
        .map(|text| json!({ "type": "text", "text": text }))
        .collect();
    json!({ "toolResult": { "toolUseId": "upstream", "content": content } })
}

/// Config pointing at `server` for tool calls and files, with an in-memory store.
pub fn relay_config(server: &MockServer, local_roots: Vec<PathBuf>) -> RelayConfig {
    RelayConfig::default()
        .with_mcp_url(format!("{}/bedrock/tool-use", server.uri()))
        .with_upstream_mcp_url(format!("{}/bedrock/tool-use", server.uri()))
        .with_files_base_url(format!("{}/files", server.uri()))
        .with_local_file_roots(local_roots)
        .with_storage_backend(StorageBackend::Memory)
}

pub fn memory_store() -> (Arc<MemoryStore>, Arc<dyn ObjectStore>) {
    let store = Arc::new(MemoryStore::new(BUCKET, REGION));
    let dyn_store: Arc<dyn ObjectStore> = store.clone();
    (store, dyn_store)
}

/// A `toolUse` request body.
pub fn tool_use_body(tool_use_id: &str, name: &str, input: Value) -> Value {
    json!({
        "toolUse": { "toolUseId": tool_use_id, "name": name, "input": input },
        "conversationId": "conv-1",
        "messageId": "msg-1",
    })
}

/// Send one request through `router` and decode the JSON response.
pub async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Joined text of a `toolResult` response.
pub fn result_text(response: &Value) -> String {
    response["toolResult"]["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|block| block["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

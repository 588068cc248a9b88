//! Tests of the S3 publishing proxy against a mock upstream MCP server.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{memory_store, mcp_reply, relay_config, result_text, send, tool_use_body};
use mcp_relay::storage::MemoryStore;
use mcp_relay::wrapper::{self, Wrapper};

const SVG: &[u8] = b"<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>";

fn wrapper_router(server: &MockServer) -> (axum::Router, Arc<MemoryStore>) {
    let (store, dyn_store) = memory_store();
    let wrapper = Arc::new(Wrapper::new(&relay_config(server, vec![]), dyn_store).unwrap());
    (wrapper::router(wrapper), store)
}

fn first_item_json(response: &Value) -> Value {
    let text = response["toolResult"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn health_reports_service_name() {
    let server = MockServer::start().await;
    let (router, _) = wrapper_router(&server);

    let (status, body) = send(router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "service": "mcp-relay-wrapper" }));
}

#[tokio::test]
async fn intercepted_tool_result_gains_s3_link() {
    let server = MockServer::start().await;
    let upstream = json!({ "status": "success", "path": "generated-diagrams/arch.svg" }).to_string();
    Mock::given(method("POST"))
        .and(path("/bedrock/tool-use"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mcp_reply(&[&upstream])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/generated-diagrams/arch.svg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(SVG))
        .mount(&server)
        .await;
    let (router, store) = wrapper_router(&server);

    let body = tool_use_body("tu-1", "generate_diagram", json!({ "project_name": "shop" }));
    let (status, response) = send(router, Method::POST, "/bedrock/tool-use", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    let item = first_item_json(&response);
    let url = item["s3_url"].as_str().unwrap();
    assert!(url.starts_with("memory://relay-test/arquitecturas/shop/generate_diagram/"));
    assert_eq!(
        item["message"],
        format!("Diagram generated and uploaded to S3: {url}")
    );
    assert_eq!(item["path"], "generated-diagrams/arch.svg");

    let keys = store.keys();
    assert_eq!(keys.len(), 1);
    let object = store.object(&keys[0]).unwrap();
    assert_eq!(object.body, SVG);
    assert_eq!(object.content_type, "image/svg+xml");
}

#[tokio::test]
async fn intercepted_tool_defaults_project_name() {
    let server = MockServer::start().await;
    let upstream = json!({ "status": "success", "path": "out/a.png" }).to_string();
    Mock::given(method("POST"))
        .and(path("/bedrock/tool-use"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mcp_reply(&[&upstream])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/out/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&server)
        .await;
    let (router, store) = wrapper_router(&server);

    let body = tool_use_body("tu-2", "generate_diagram", json!({}));
    send(router, Method::POST, "/bedrock/tool-use", Some(body)).await;

    let keys = store.keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("arquitecturas/auto-generated/generate_diagram/"));
}

#[tokio::test]
async fn other_tools_pass_through_unchanged() {
    let server = MockServer::start().await;
    let upstream = mcp_reply(&[r#"{"status":"success","path":"x.png"}"#]);
    Mock::given(method("POST"))
        .and(path("/bedrock/tool-use"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
        .mount(&server)
        .await;
    let (router, store) = wrapper_router(&server);

    let body = tool_use_body("tu-3", "list_icons", json!({}));
    let (_, response) = send(router, Method::POST, "/bedrock/tool-use", Some(body)).await;

    assert_eq!(response, upstream);
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn failed_download_leaves_item_untouched() {
    let server = MockServer::start().await;
    let text = r#"{"status":"success","path":"missing.png"}"#;
    let upstream = mcp_reply(&[text, "plain words"]);
    Mock::given(method("POST"))
        .and(path("/bedrock/tool-use"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let (router, store) = wrapper_router(&server);

    let body = tool_use_body("tu-4", "generate_diagram", json!({}));
    let (_, response) = send(router, Method::POST, "/bedrock/tool-use", Some(body)).await;

    assert_eq!(response, upstream);
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn upstream_error_status_becomes_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bedrock/tool-use"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    let (router, _) = wrapper_router(&server);

    let body = tool_use_body("tu-5", "generate_diagram", json!({}));
    let (_, response) = send(router, Method::POST, "/bedrock/tool-use", Some(body)).await;

    assert_eq!(response, json!({ "error": "MCP error: 502" }));
}

#[tokio::test]
async fn non_json_upstream_body_is_reported_as_tool_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bedrock/tool-use"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway page</html>"))
        .mount(&server)
        .await;
    let (_, dyn_store) = memory_store();
    let wrapper = Wrapper::new(&relay_config(&server, vec![]), dyn_store).unwrap();

    let body = tool_use_body("tu-7", "generate_diagram", json!({}));
    let response = wrapper.relay(body).await;

    assert_eq!(response["toolResult"]["toolUseId"], "tu-7");
    let text = result_text(&response);
    assert!(text.starts_with("❌ Error in MCP S3 wrapper: Serialization error"), "{text}");
}

#[tokio::test]
async fn unreachable_upstream_is_reported_as_tool_result() {
    let server = MockServer::start().await;
    let config = relay_config(&server, vec![])
        .with_upstream_mcp_url("http://127.0.0.1:9/bedrock/tool-use");
    let (_, dyn_store) = memory_store();
    let wrapper = Arc::new(Wrapper::new(&config, dyn_store).unwrap());

    let body = tool_use_body("tu-6", "generate_diagram", json!({}));
    let response = wrapper.relay(body).await;

    assert_eq!(response["toolResult"]["toolUseId"], "tu-6");
    assert!(result_text(&response).starts_with("❌ Error in MCP S3 wrapper: "));
}

//! HTTP client for the MCP tool-use endpoint and its file server.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Map, Value};

use super::result::{ToolOutput, UpstreamResponse};
use crate::config::RelayConfig;
use crate::error::{RelayError, Result};

/// Client bound to one tool-use endpoint and one files endpoint.
#[derive(Debug, Clone)]
pub struct McpClient {
    http: reqwest::Client,
    tool_use_url: String,
    files_base_url: String,
    download_timeout: Duration,
}

impl McpClient {
    /// Client for the gateway's MCP endpoint.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(
            config.mcp_url.clone(),
            config.files_base_url.clone(),
            config.mcp_timeout,
            config.download_timeout,
        )
    }

    /// Client for the wrapper's upstream MCP endpoint.
    pub fn upstream_from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(
            config.upstream_mcp_url.clone(),
            config.files_base_url.clone(),
            config.mcp_timeout,
            config.download_timeout,
        )
    }

    pub fn new(
        tool_use_url: impl Into<String>,
        files_base_url: impl Into<String>,
        call_timeout: Duration,
        download_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(call_timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self {
            http,
            tool_use_url: tool_use_url.into(),
            files_base_url: files_base_url.into(),
            download_timeout,
        })
    }

    pub fn tool_use_url(&self) -> &str {
        &self.tool_use_url
    }

    /// Invoke a tool and flatten its result content.
    pub async fn call_tool(
        &self,
        tool_name: &str,
        input: &Map<String, Value>,
        conversation_id: Option<&str>,
        message_id: Option<&str>,
    ) -> Result<ToolOutput> {
        let payload = tool_use_payload(tool_name, input, conversation_id, message_id);
        tracing::info!(tool = tool_name, url = %self.tool_use_url, "Calling MCP tool");
        tracing::debug!(payload = %payload, "MCP payload");

        let response = self
            .http
            .post(&self.tool_use_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::from_tool_call(tool_name, e))?;

        let status = response.status();
        tracing::info!(tool = tool_name, status = status.as_u16(), "MCP responded");

        let body = response
            .text()
            .await
            .map_err(|e| RelayError::from_tool_call(tool_name, e))?;
        if status != StatusCode::OK {
            tracing::error!(tool = tool_name, status = status.as_u16(), body = %body, "MCP call failed");
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: UpstreamResponse = serde_json::from_str(&body)?;
        let content = parsed.tool_result.map(|r| r.content).unwrap_or_default();
        let output = ToolOutput::from_content(&content);
        tracing::info!(tool = tool_name, fields = output.fields().len(), "MCP tool completed");
        Ok(output)
    }

    /// Send a request body unchanged and return the upstream status and JSON body.
    ///
    /// Error statuses come back with a `Value::Null` body; a 200 whose body is
    /// not JSON is a serialization error.
    pub async fn forward(&self, body: &Value) -> Result<(u16, Value)> {
        let response = self.http.post(&self.tool_use_url).json(body).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Ok((status.as_u16(), Value::Null));
        }
        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes)?;
        Ok((status.as_u16(), value))
    }

    /// URL under which the MCP server exposes a generated file.
    pub fn file_url(&self, path: &str) -> String {
        let base = self.files_base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Download a file the MCP server generated at `path`.
    pub async fn fetch_file(&self, path: &str) -> Result<Vec<u8>> {
        self.download(&self.file_url(path)).await
    }

    /// GET `url` and return its body; any non-200 status is an error.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        tracing::info!(url, "Downloading file");
        let response = self
            .http
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Build the tool-use body, filling ids the caller left out.
pub fn tool_use_payload(
    tool_name: &str,
    input: &Map<String, Value>,
    conversation_id: Option<&str>,
    message_id: Option<&str>,
) -> Value {
    json!({
        "toolUse": {
            "toolUseId": format!("bedrock-{tool_name}-{}", message_id.unwrap_or("auto")),
            "name": tool_name,
            "input": input,
        },
        "conversationId": conversation_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("bedrock-conversation-{tool_name}")),
        "messageId": message_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("bedrock-message-{tool_name}")),
    })
}

//! Bedrock Converse `toolUse` / `toolResult` payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Incoming tool invocation as posted by the function-calling client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolUseRequest {
    #[serde(rename = "toolUse", default)]
    pub tool_use: ToolUse,
    #[serde(rename = "conversationId", default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(rename = "messageId", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl ToolUseRequest {
    /// Project name from the tool input, then the request body, then `fallback`.
    pub fn project_name_or(&self, fallback: &str) -> String {
        let non_empty = |name: &&str| !name.is_empty();
        self.tool_use
            .input_str("project_name")
            .filter(non_empty)
            .or_else(|| self.project_name.as_deref().filter(non_empty))
            .unwrap_or(fallback)
            .to_string()
    }
}

/// The `toolUse` block of a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolUse {
    #[serde(rename = "toolUseId", default, skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub input: Map<String, Value>,
}

impl ToolUse {
    /// String value of an input argument, if present.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }
}

/// Response body wrapping a single tool result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultEnvelope {
    #[serde(rename = "toolResult")]
    pub tool_result: ToolResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(rename = "toolUseId")]
    pub tool_use_id: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl ToolResult {
    pub fn new(tool_use_id: impl Into<String>, content: Vec<ContentBlock>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content,
        }
    }

    pub fn into_envelope(self) -> ToolResultEnvelope {
        ToolResultEnvelope { tool_result: self }
    }
}

/// One content item. MCP servers sometimes omit `type`, so both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentBlock {
    /// Untyped text block, the shape Bedrock expects in tool results.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: None,
            text: Some(text.into()),
        }
    }

    /// Text payload when the block carries one, regardless of `type`.
    pub fn as_text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

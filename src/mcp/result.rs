//! Flattening of MCP tool result content into a single field map.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::ContentBlock;

/// Key under which non-JSON text content is collected.
pub const RAW_TEXT_KEY: &str = "raw_text";

/// Body returned by the MCP tool-use endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamResponse {
    #[serde(rename = "toolResult", default)]
    pub tool_result: Option<UpstreamToolResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpstreamToolResult {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// Fields produced by a tool call.
///
/// JSON-object texts contribute their keys; other texts accumulate under
/// [`RAW_TEXT_KEY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    fields: Map<String, Value>,
}

impl ToolOutput {
    pub fn from_content(content: &[ContentBlock]) -> Self {
        let mut fields = Map::new();
        let mut raw_text: Option<String> = None;

        for text in content.iter().filter_map(ContentBlock::as_text) {
            match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(parsed)) => {
                    tracing::debug!(keys = parsed.len(), "Parsed JSON tool content");
                    fields.extend(parsed);
                }
                _ => match raw_text.as_mut() {
                    Some(existing) => {
                        existing.push('\n');
                        existing.push_str(text);
                    }
                    None => raw_text = Some(text.to_string()),
                },
            }
        }

        if let Some(text) = raw_text {
            fields.insert(RAW_TEXT_KEY.to_string(), Value::String(text));
        }
        Self { fields }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.get_str(RAW_TEXT_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Pretty JSON of every field.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_else(|_| "{}".to_string())
    }
}

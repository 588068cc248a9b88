//! Client side of the remote MCP tool servers.

pub mod client;
pub mod result;

pub use client::{tool_use_payload, McpClient};
pub use result::{ToolOutput, RAW_TEXT_KEY};

//! Wire types for tool-use requests and tool results.

pub mod tool_use;

pub use tool_use::{ContentBlock, ToolResult, ToolResultEnvelope, ToolUse, ToolUseRequest};

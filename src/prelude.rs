//! Convenience re-exports for common use.

pub use crate::config::{RelayConfig, StorageBackend};
pub use crate::error::{RelayError, Result};
pub use crate::gateway::Gateway;
pub use crate::mcp::{McpClient, ToolOutput};
pub use crate::storage::{MemoryStore, ObjectStore, S3Store, UploadedFile, Uploader};
pub use crate::types::{ContentBlock, ToolResult, ToolResultEnvelope, ToolUse, ToolUseRequest};
pub use crate::wrapper::Wrapper;

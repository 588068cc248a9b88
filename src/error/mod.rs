//! Error types for mcp-relay.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all relay operations.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("MCP error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timeout calling MCP tool {tool_name}")]
    Timeout { tool_name: String },

    #[error("Connection error calling MCP tool {tool_name}: {message}")]
    Connection { tool_name: String, message: String },

    #[error("Storage error: {message}")]
    Storage { message: String, retryable: bool },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tool not allowed: {0}")]
    ToolNotAllowed(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl RelayError {
    /// Create a storage error that may succeed on retry.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            retryable: true,
        }
    }

    /// Create a storage error that will not succeed on retry.
    pub fn storage_fatal(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            retryable: false,
        }
    }

    /// Map a transport error from a tool call, separating timeouts.
    pub fn from_tool_call(tool_name: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                tool_name: tool_name.to_string(),
            }
        } else {
            Self::Connection {
                tool_name: tool_name.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Network(_) | Self::Connection { .. } => ErrorCategory::Network,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Serialization(_) | Self::Decode(_) => ErrorCategory::Serialization,
            Self::Upstream { status, .. } => match status {
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Upstream,
            },
            Self::Storage { .. } => ErrorCategory::Storage,
            Self::ToolNotAllowed(_) | Self::InvalidArgument(_) => ErrorCategory::Request,
            Self::Io(_) | Self::FileNotFound(_) => ErrorCategory::Filesystem,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage { retryable, .. } => *retryable,
            _ => matches!(
                self.category(),
                ErrorCategory::RateLimit
                    | ErrorCategory::Network
                    | ErrorCategory::Timeout
                    | ErrorCategory::Server
            ),
        }
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::RateLimit
            | ErrorCategory::Network
            | ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Storage if self.is_retryable() => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Storage => RecoverySuggestion::CheckCredentials,
            ErrorCategory::Request => RecoverySuggestion::FixRequest,
            _ => RecoverySuggestion::InspectUpstream,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RelayError>;

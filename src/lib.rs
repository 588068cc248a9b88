//! mcp-relay: tool-use gateway for remote MCP servers
//!
//! Receives Bedrock Converse style `toolUse` requests, runs them against an
//! MCP tool server and publishes whatever file the tool produced to object
//! storage, answering with a `toolResult` that carries the download link.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use mcp_relay::prelude::*;
//!
//! # async fn example() -> mcp_relay::error::Result<()> {
//! let config = RelayConfig::from_env()?;
//! let store = mcp_relay::storage::store_from_config(&config).await;
//! let gateway = Arc::new(Gateway::new(config, store)?);
//! let app = mcp_relay::gateway::router(gateway);
//! mcp_relay::server::serve(app, "0.0.0.0:8000".parse().unwrap(), "gateway").await
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod gateway;
pub mod mcp;
pub mod prelude;
pub mod server;
pub mod storage;
pub mod tools;
pub mod types;
pub mod util;
pub mod wrapper;

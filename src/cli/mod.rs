//! Command-line interface of the `mcp-relay` binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// MCP relay: tool-use gateway and S3 publishing proxy
#[derive(Parser, Debug)]
#[command(name = "mcp-relay", version, about = "Relay LLM tool calls to MCP servers and publish their files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log filter
    #[arg(long, global = true, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Also write JSON logs to this file
    #[arg(long, global = true, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the tool-use gateway
    Gateway {
        #[arg(long, default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
    },
    /// Run the S3 publishing proxy in front of an MCP server
    Wrapper {
        #[arg(long, default_value = "0.0.0.0:8001")]
        bind: SocketAddr,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

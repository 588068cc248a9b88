//! `mcp-relay` binary entry point.

use std::path::PathBuf;
use std::sync::Arc;

use mcp_relay::cli::{Cli, Commands};
use mcp_relay::config::RelayConfig;
use mcp_relay::error::Result;
use mcp_relay::gateway::{self, Gateway};
use mcp_relay::storage;
use mcp_relay::wrapper::{self, Wrapper};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing(log_level: &str, log_file: Option<PathBuf>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(true);

    let file_layer = log_file.map(|path| {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let filename = path.file_name().unwrap_or_default();
        let file_appender = tracing_appender::rolling::never(parent, filename);
        fmt::layer().with_writer(file_appender).with_ansi(false).json()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = RelayConfig::from_env()?;
    let log_level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    init_tracing(&log_level, cli.log_file.or_else(|| config.log_file.clone()));

    let store = storage::store_from_config(&config).await;
    match cli.command {
        Commands::Gateway { bind } => {
            tracing::info!(
                mcp_url = %config.mcp_url,
                bucket = %config.s3_bucket,
                backend = %config.storage_backend,
                "Starting gateway"
            );
            let gateway = Arc::new(Gateway::new(config, store)?);
            mcp_relay::server::serve(gateway::router(gateway), bind, "gateway").await
        }
        Commands::Wrapper { bind } => {
            tracing::info!(
                upstream = %config.upstream_mcp_url,
                bucket = %config.s3_bucket,
                intercept = ?config.intercept_tools,
                "Starting wrapper"
            );
            let wrapper = Arc::new(Wrapper::new(&config, store)?);
            mcp_relay::server::serve(wrapper::router(wrapper), bind, "wrapper").await
        }
    }
}

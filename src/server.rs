//! Serving a router until Ctrl-C.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::error::Result;

pub async fn serve(router: Router, addr: SocketAddr, service: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(service, addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!(service, "Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

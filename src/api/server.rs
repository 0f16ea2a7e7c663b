use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{errors::Error, startup::GatewayContext};

use super::routes::build_router;

/// Bind `host:port` and serve the gateway until ctrl-c
pub async fn start_gateway_server(
    host: &str,
    port: u16,
    context: Arc<GatewayContext>,
) -> crate::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| Error::config(format!("Invalid server address: {}", e)))?;

    let rpc_path = context.rpc_path.clone();
    let router: Router = build_router(context);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::transport(format!("Failed to bind gateway server: {}", e)))?;

    info!(address = %addr, rpc_path = %rpc_path, "Starting MCP gateway server");
    run_http_server(listener, router).await?;

    info!("Gateway server shutdown completed");
    Ok(())
}

async fn run_http_server(listener: TcpListener, router: Router) -> crate::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Gateway shutdown listener failed");
            }
        })
        .await
        .map_err(|e| Error::transport(format!("Gateway server error: {}", e)))
}

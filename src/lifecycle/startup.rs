//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the metrics exporter when configured
//! - Bind the listener and run the server until shutdown
//!
//! # Design Decisions
//! - Fail fast: bind errors are fatal
//! - A broken metrics exporter is logged, not fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Run the proxy described by `config` until `shutdown` fires.
pub async fn run(config: ProxyConfig, shutdown: &Shutdown) -> Result<(), std::io::Error> {
    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => {
                tracing::error!(metrics_address = %addr, "Failed to parse metrics address");
            }
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        route_prefix = %config.forwarding.route_prefix,
        policy = %config.forwarding.policy,
        "Proxy server running"
    );

    HttpServer::new(config).run(listener, shutdown.subscribe()).await
}

//! Validator forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                ┌──────────────────────────────────────────┐
//!     ───────────────────────┼─▶ http server ─▶ routing::rewrite        │
//!  /proxy/<path>?target=h:p  │   (request id,    (target + forward path)│
//!                            │    trace, CORS)          │               │
//!                            │                          ▼               │
//!     ◀──────────────────────┼── response relay ◀── hyper client ◀──────┼──── Validator
//!                            │                     (bounded wait)       │     http://h:p
//!                            └──────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from the environment only (`PORT`, `PROXY_*`).

use validator_proxy::config;
use validator_proxy::lifecycle::{startup, Shutdown};
use validator_proxy::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_from_env()?;

    logging::init_logging(&config.observability);

    tracing::info!("validator-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        policy = %config.forwarding.policy,
        connect_timeout_secs = config.timeouts.connect_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );
    match serde_json::to_string(&config) {
        Ok(resolved) => tracing::debug!(config = %resolved, "Resolved configuration"),
        Err(e) => tracing::warn!(error = %e, "Could not serialize configuration"),
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

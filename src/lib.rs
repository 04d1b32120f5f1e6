//! Forwarding proxy for validator nodes.
//!
//! Browser front-ends cannot call validators directly (CORS, mixed
//! content), so they call this proxy with the validator's `host:port` in
//! the `target` query parameter and the proxy relays the request.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

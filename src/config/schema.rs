//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! Values are populated from the environment by the loader; every type is
//! `Serialize` so the resolved configuration is dumped as JSON at startup.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct ProxyConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// How inbound requests map onto upstream requests.
    pub forwarding: ForwardingConfig,

    /// Timeout configuration for the upstream leg.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Listening port.
    pub port: u16,
}

impl ListenerConfig {
    /// Socket address string in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Strategy used to derive the upstream path from an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RewritePolicy {
    /// Strip the route prefix from the inbound path and forward the rest,
    /// along with the query string minus `target`.
    #[default]
    PathRewrite,

    /// Use the `path` query parameter verbatim as the upstream path.
    QueryPath,
}

impl RewritePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewritePolicy::PathRewrite => "path-rewrite",
            RewritePolicy::QueryPath => "query-path",
        }
    }
}

impl fmt::Display for RewritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "path-rewrite" | "path_rewrite" => Ok(RewritePolicy::PathRewrite),
            "query-path" | "query_path" => Ok(RewritePolicy::QueryPath),
            other => Err(format!(
                "unknown rewrite policy '{}' (expected 'path-rewrite' or 'query-path')",
                other
            )),
        }
    }
}

/// Forwarding configuration.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ForwardingConfig {
    /// Route prefix the proxy answers on (e.g., "/proxy").
    pub route_prefix: String,

    /// Rewrite policy for the upstream path.
    pub policy: RewritePolicy,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            route_prefix: "/proxy".to_string(),
            policy: RewritePolicy::default(),
        }
    }
}

/// Timeout configuration for the upstream leg.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Maximum wait for the upstream response head in seconds.
    pub upstream_secs: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn upstream(&self) -> Duration {
        Duration::from_secs(self.upstream_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            // Config generation on a validator can take well over a minute.
            upstream_secs: 100,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset.
    pub log_level: String,

    /// Prometheus exporter bind address; metrics are disabled when absent.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}

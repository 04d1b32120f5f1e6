//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (the loader handles parsing)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Validate the route prefix shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// An environment variable held a value that could not be parsed.
    #[error("{var}={value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("listener host must not be empty")]
    EmptyHost,

    #[error("route prefix {0:?} must start with '/', must not end with '/' and must not contain '?', '{{', '}}' or '*'")]
    RoutePrefix(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("unknown log level {0:?}")]
    LogLevel(String),

    #[error("metrics address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    let prefix = &config.forwarding.route_prefix;
    if !prefix.starts_with('/')
        || prefix.ends_with('/')
        || prefix.contains(['?', '{', '}', '*'])
    {
        errors.push(ValidationError::RoutePrefix(prefix.clone()));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect timeout"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream timeout"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::MetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Configuration loading from the process environment.
//!
//! The proxy has no config file and no CLI flags; every knob is an
//! environment variable with a fixed fallback default.

use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::{ProxyConfig, RewritePolicy};
use crate::config::validation::{validate_config, ValidationError};

/// Listening port, same variable the hosting platform sets.
pub const ENV_PORT: &str = "PORT";
pub const ENV_BIND_HOST: &str = "PROXY_BIND_HOST";
pub const ENV_ROUTE_PREFIX: &str = "PROXY_ROUTE_PREFIX";
pub const ENV_REWRITE_POLICY: &str = "PROXY_REWRITE_POLICY";
pub const ENV_CONNECT_TIMEOUT: &str = "PROXY_CONNECT_TIMEOUT_SECS";
pub const ENV_UPSTREAM_TIMEOUT: &str = "PROXY_UPSTREAM_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "PROXY_LOG_LEVEL";
pub const ENV_METRICS_ADDRESS: &str = "PROXY_METRICS_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from the process environment.
pub fn load_from_env() -> Result<ProxyConfig, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

/// Load and validate configuration using `lookup` to resolve variables.
///
/// Unset or blank variables keep their defaults. Parse failures and
/// semantic problems are reported together.
pub fn load_with<F>(lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ProxyConfig::default();
    let mut errors = Vec::new();

    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = parse_var(&get, ENV_PORT, &mut errors) {
        config.listener.port = port;
    }
    if let Some(host) = get(ENV_BIND_HOST) {
        config.listener.host = host.trim().to_string();
    }
    if let Some(prefix) = get(ENV_ROUTE_PREFIX) {
        config.forwarding.route_prefix = prefix.trim().to_string();
    }
    if let Some(policy) = parse_var::<RewritePolicy, _>(&get, ENV_REWRITE_POLICY, &mut errors) {
        config.forwarding.policy = policy;
    }
    if let Some(secs) = parse_var(&get, ENV_CONNECT_TIMEOUT, &mut errors) {
        config.timeouts.connect_secs = secs;
    }
    if let Some(secs) = parse_var(&get, ENV_UPSTREAM_TIMEOUT, &mut errors) {
        config.timeouts.upstream_secs = secs;
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.observability.log_level = level.trim().to_string();
    }
    if let Some(addr) = get(ENV_METRICS_ADDRESS) {
        config.observability.metrics_address = Some(addr.trim().to_string());
    }

    if let Err(semantic) = validate_config(&config) {
        errors.extend(semantic);
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Validation(errors))
    }
}

fn parse_var<T, G>(get: &G, var: &'static str, errors: &mut Vec<ValidationError>) -> Option<T>
where
    T: FromStr,
    T::Err: ToString,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(var)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(ValidationError::InvalidValue {
                var,
                value: raw,
                reason: e.to_string(),
            });
            None
        }
    }
}

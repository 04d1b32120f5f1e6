//! Upstream target and path resolution.
//!
//! # Responsibilities
//! - Extract the `target` (and, under `query-path`, the `path`) control
//!   parameters from the inbound query string
//! - Build the upstream URI `http://<target><forward path>`
//! - Keep control parameters out of the forwarded query string
//!
//! # Design Decisions
//! - Resolution is a pure function of the inbound URI; no I/O happens here,
//!   so a rejected request never reaches the network
//! - The route prefix is stripped exactly once
//! - Forwarded query pairs are copied raw (not re-encoded) and keep their order

use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::Uri;
use std::str::FromStr;
use thiserror::Error;
use url::form_urlencoded;

use crate::config::{ForwardingConfig, RewritePolicy};

/// Query parameter naming the upstream `host:port`.
pub const TARGET_PARAM: &str = "target";

/// Query parameter carrying the explicit upstream path (`query-path` only).
pub const PATH_PARAM: &str = "path";

/// Reasons an inbound request cannot be mapped to an upstream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RewriteError {
    #[error("Missing target parameter")]
    MissingTarget,

    #[error("Missing target or path parameter")]
    MissingTargetOrPath,

    #[error("Invalid target parameter")]
    InvalidTarget(String),

    #[error("Invalid path parameter")]
    InvalidPath(String),
}

/// A resolved upstream destination for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forward {
    /// Upstream `host:port`, also used as the outgoing `Host` header.
    pub authority: Authority,

    /// Absolute upstream URI.
    pub uri: Uri,
}

/// Maps inbound request URIs to upstream URIs according to a [`RewritePolicy`].
#[derive(Debug, Clone)]
pub struct Rewriter {
    prefix: String,
    policy: RewritePolicy,
}

impl Rewriter {
    pub fn new(config: &ForwardingConfig) -> Self {
        Self {
            prefix: config.route_prefix.clone(),
            policy: config.policy,
        }
    }

    pub fn policy(&self) -> RewritePolicy {
        self.policy
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve the upstream destination for an inbound URI.
    pub fn resolve(&self, inbound: &Uri) -> Result<Forward, RewriteError> {
        let query = inbound.query().unwrap_or("");
        let target = query_param(query, TARGET_PARAM);

        let (target, path_and_query) = match self.policy {
            RewritePolicy::PathRewrite => {
                let target = target.ok_or(RewriteError::MissingTarget)?;
                let path = self.strip_prefix(inbound.path());
                let path_and_query = match scrub_query(query, &[TARGET_PARAM]) {
                    Some(rest) => format!("{}?{}", path, rest),
                    None => path,
                };
                (target, path_and_query)
            }
            RewritePolicy::QueryPath => {
                let (Some(target), Some(path)) = (target, query_param(query, PATH_PARAM)) else {
                    return Err(RewriteError::MissingTargetOrPath);
                };
                let path = if path.starts_with('/') {
                    path
                } else {
                    format!("/{}", path)
                };
                (target, path)
            }
        };

        let authority = parse_target(&target)?;
        let path_and_query = PathAndQuery::from_str(&path_and_query)
            .map_err(|_| RewriteError::InvalidPath(path_and_query.clone()))?;

        let uri = Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(authority.clone())
            .path_and_query(path_and_query)
            .build()
            .map_err(|_| RewriteError::InvalidTarget(target))?;

        Ok(Forward { authority, uri })
    }

    /// Remove the route prefix from `path` once. The remainder always
    /// starts with `/`.
    fn strip_prefix(&self, path: &str) -> String {
        let rest = match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest,
            None => path,
        };

        if rest.is_empty() {
            "/".to_string()
        } else if rest.starts_with('/') {
            rest.to_string()
        } else {
            format!("/{}", rest)
        }
    }
}

/// First non-empty decoded value of `name` in a raw query string.
fn query_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Drop the pairs whose decoded key is in `names`, keeping the rest verbatim.
fn scrub_query(query: &str, names: &[&str]) -> Option<String> {
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = form_urlencoded::parse(pair.as_bytes())
                .next()
                .map(|(key, _)| key.into_owned())
                .unwrap_or_default();
            !names.contains(&key.as_str())
        })
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join("&"))
    }
}

fn parse_target(target: &str) -> Result<Authority, RewriteError> {
    let authority =
        Authority::from_str(target).map_err(|_| RewriteError::InvalidTarget(target.to_string()))?;

    // user-info would let a caller smuggle credentials into the Host header
    if authority.as_str().contains('@') {
        return Err(RewriteError::InvalidTarget(target.to_string()));
    }

    // an unparseable or empty port would silently become port 80 on connect
    if authority.host().is_empty() || authority.port_u16().is_none() {
        return Err(RewriteError::InvalidTarget(target.to_string()));
    }

    Ok(authority)
}

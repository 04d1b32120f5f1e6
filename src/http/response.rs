//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Relay the upstream response to the caller
//! - Map proxy failures to HTTP status codes with a plain-text body
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Upstream status codes (including 4xx/5xx) are relayed untouched
//! - Synthesized errors only when no upstream response was received:
//!   connection failures → 502, upstream and connect timeouts → 504
//! - Relayed bodies carry an idle deadline so a stalled upstream cannot pin
//!   the caller's connection

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;
use hyper_util::client::legacy;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::resilience::IdleTimeoutBody;
use crate::routing::RewriteError;

/// Everything that can stop a request from being relayed.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The request does not name a usable upstream. No network call was made.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// The outgoing request could not be assembled.
    #[error("Failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    /// Refused connection, DNS failure or malformed response.
    #[error("Upstream request failed: {0}")]
    Upstream(legacy::Error),

    /// TCP connect did not complete within the connect timeout.
    #[error("Upstream connect timed out: {0}")]
    ConnectTimeout(legacy::Error),

    /// No response head within the upstream deadline.
    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<legacy::Error> for ProxyError {
    fn from(err: legacy::Error) -> Self {
        if err.is_connect() && caused_by_timeout(&err) {
            ProxyError::ConnectTimeout(err)
        } else {
            ProxyError::Upstream(err)
        }
    }
}

/// True if any error in the `source` chain is an I/O timeout.
fn caused_by_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::TimedOut {
                return true;
            }
        }
        current = e.source();
    }
    false
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Rewrite(_) => StatusCode::BAD_REQUEST,
            ProxyError::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::ConnectTimeout(_) | ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Rewrite(_) => "bad_request",
            ProxyError::Build(_) => "build",
            ProxyError::Upstream(e) if e.is_connect() => "connect",
            ProxyError::Upstream(_) => "upstream",
            ProxyError::ConnectTimeout(_) => "connect_timeout",
            ProxyError::Timeout(_) => "timeout",
        }
    }

    /// Body sent to the caller. Internal details stay in the logs.
    fn client_message(&self) -> String {
        match self {
            ProxyError::Rewrite(e) => e.to_string(),
            ProxyError::Build(_) => "Failed to build upstream request".to_string(),
            ProxyError::Upstream(_) => "Upstream request failed".to_string(),
            ProxyError::ConnectTimeout(_) | ProxyError::Timeout(_) => {
                "Upstream request timed out".to_string()
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.client_message()).into_response()
    }
}

/// Hand the upstream response back to the caller as-is. The body stream is
/// aborted if the upstream sends nothing for `idle`.
pub fn relay(response: hyper::Response<Incoming>, idle: Duration) -> Response {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(IdleTimeoutBody::new(body, idle)))
}

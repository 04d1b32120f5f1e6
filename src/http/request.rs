//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Prepare the inbound request for forwarding to the upstream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing and forwarded upstream
//! - Hop-by-hop headers are connection-scoped and never forwarded
//! - Host is rewritten to the upstream authority
//! - The body is handed over as a stream, never buffered

use axum::body::Body;
use axum::http::header::{CONNECTION, HOST};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Request, Version};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::Forward;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Generates UUID v4 request IDs for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID header, or `"unknown"` when absent.
pub fn request_id_of<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Build the outgoing request for `forward` from the inbound parts and body.
///
/// The inbound HTTP version is not carried over; the upstream leg always
/// speaks HTTP/1.1.
pub fn upstream_request(
    parts: Parts,
    body: Body,
    forward: &Forward,
) -> Result<Request<Body>, axum::http::Error> {
    let mut builder = Request::builder()
        .method(parts.method)
        .uri(forward.uri.clone())
        .version(Version::HTTP_11);

    if let Some(headers) = builder.headers_mut() {
        *headers = forwarded_headers(&parts.headers, forward);
    }

    builder.body(body)
}

/// Copy of `inbound` headers suitable for the upstream leg.
pub fn forwarded_headers(inbound: &HeaderMap, forward: &Forward) -> HeaderMap {
    let mut headers = inbound.clone();
    strip_hop_by_hop(&mut headers);

    if let Ok(host) = HeaderValue::from_str(forward.authority.as_str()) {
        headers.insert(HOST, host);
    }

    headers
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<String> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    for name in &listed {
        headers.remove(name.as_str());
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

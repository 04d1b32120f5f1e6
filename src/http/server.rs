//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router for the proxy prefix
//! - Wire up middleware (request ID, tracing, CORS)
//! - Bind server to listener with graceful shutdown
//! - Resolve each request's upstream and forward it
//! - Bound the upstream wait; map failures to 400/502/504

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, TimeoutConfig};
use crate::http::request::{request_id_of, upstream_request, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::{relay, ProxyError};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::resilience::bounded;
use crate::routing::Rewriter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rewriter: Arc<Rewriter>,
    pub client: Client<HttpConnector, Body>,
    pub upstream_timeout: Duration,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let state = AppState {
            rewriter: Arc::new(Rewriter::new(&config.forwarding)),
            client: Self::build_client(&config.timeouts),
            upstream_timeout: config.timeouts.upstream(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    fn build_client(timeouts: &TimeoutConfig) -> Client<HttpConnector, Body> {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeouts.connect()));
        connector.set_nodelay(true);

        Client::builder(TokioExecutor::new()).build(connector)
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let prefix = config.forwarding.route_prefix.as_str();

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id_of(request),
            )
        });

        Router::new()
            .route(prefix, any(proxy_handler))
            .route(&format!("{}/", prefix), any(proxy_handler))
            .route(&format!("{}/{{*rest}}", prefix), any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(
                        axum::http::HeaderName::from_static(X_REQUEST_ID),
                        MakeRequestUuid,
                    ))
                    .layer(trace)
                    .layer(PropagateRequestIdLayer::new(
                        axum::http::HeaderName::from_static(X_REQUEST_ID),
                    ))
                    .layer(cors),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown_rx` fires. In-flight requests are drained before returning.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            policy = %self.config.forwarding.policy,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The configured router, for embedding or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Resolves the target, forwards the request, and relays the response.
///
/// If the caller disconnects, this future is dropped together with the
/// pending upstream request, which closes the upstream socket.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request_id_of(&request);

    match forward(&state, request, &request_id).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                status = %response.status(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Upstream responded"
            );
            metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
            response
        }
        Err(err) => {
            match &err {
                ProxyError::Rewrite(e) => {
                    tracing::warn!(request_id = %request_id, error = ?e, "Rejected request");
                }
                other => {
                    tracing::error!(request_id = %request_id, kind = other.kind(), error = %other, "Upstream error");
                    metrics::record_upstream_error(other.kind());
                }
            }
            metrics::record_request(method.as_str(), err.status().as_u16(), start_time);
            err.into_response()
        }
    }
}

async fn forward(
    state: &AppState,
    request: Request<Body>,
    request_id: &str,
) -> Result<Response, ProxyError> {
    let target = state.rewriter.resolve(request.uri())?;

    tracing::debug!(
        request_id = %request_id,
        target = %target.authority,
        upstream_uri = %target.uri,
        "Proxying request"
    );

    let (parts, body) = request.into_parts();
    let outgoing = upstream_request(parts, body, &target)?;

    let response = bounded(state.upstream_timeout, state.client.request(outgoing)).await?;
    Ok(relay(response, state.upstream_timeout))
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler on every path
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener, stop on shutdown
//! - Run each request through extract → decode → validate → filter →
//!   fetch → sanitize

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::http::fallback;
use crate::http::forward::UpstreamClient;
use crate::http::request::{request_id_of, MakeRequestUuidV4, ProxyRequest};
use crate::http::response;
use crate::lifecycle::shutdown::ShutdownListener;
use crate::observability::metrics;
use crate::routing::{self, PathExtractor};
use crate::security::EgressFilter;

/// Errors raised while constructing or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn PathExtractor>,
    pub egress: Arc<EgressFilter>,
    pub upstream: UpstreamClient,
    pub preserve_host: bool,
}

impl AppState {
    pub fn from_config(config: &ProxyConfig) -> std::result::Result<Self, ServerError> {
        let egress = Arc::new(EgressFilter::new(&config.security));
        Ok(Self {
            extractor: routing::from_config(&config.extraction),
            upstream: UpstreamClient::new(&config.upstream, egress.clone())?,
            egress,
            preserve_host: config.upstream.preserve_host,
        })
    }
}

/// HTTP server for the path proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    egress_filtered: bool,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> std::result::Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        let egress_filtered = state.egress.is_enabled();
        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            egress_filtered,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id());

        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownListener,
    ) -> std::result::Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = ?self.config.extraction.mode,
            upstream_timeout_secs = self.config.upstream.timeout_secs,
            egress_filter = self.egress_filtered,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Resolves the target from the path, forwards the request and relays the answer.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id_of(&request);
    let method = request.method().clone();

    let response = match handle(&state, request).await {
        Ok(response) => response,
        Err(err) => {
            match &err {
                ProxyError::UpstreamFetch(_) | ProxyError::UpstreamTimeout(_) => {
                    tracing::warn!(request_id = %request_id, kind = err.kind(), error = %err, "Upstream failure");
                }
                _ => {
                    tracing::debug!(request_id = %request_id, kind = err.kind(), error = %err, "Rejected request");
                }
            }
            metrics::record_error(err.kind());
            err.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

/// Proxy a single request. Errors are turned into responses by the caller.
pub async fn handle(state: &AppState, request: Request<Body>) -> Result<Response> {
    let target = match routing::resolve_target(state.extractor.as_ref(), request.uri())? {
        Some(target) => target,
        None => {
            let host = fallback::request_host(&request);
            return Ok(fallback::render(state.extractor.as_ref(), host.as_deref()));
        }
    };

    state.egress.check(&target)?;

    tracing::debug!(
        request_id = %request_id_of(&request),
        method = %request.method(),
        target = %target,
        "Proxying request"
    );

    let forward = ProxyRequest::from_inbound(request, target, state.preserve_host);
    let upstream = state.upstream.fetch(forward).await?;

    tracing::debug!(status = %upstream.status(), final_url = %upstream.url(), "Upstream responded");

    Ok(response::relay(upstream))
}

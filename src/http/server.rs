//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Dispatch requests to the route table and the gateway
//! - Observability (metrics, request IDs)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::{Gateway, GatewayError};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::http::response::{EnvelopeResponse, ResponseEnvelope};
use crate::lifecycle::shutdown::signalled;
use crate::observability::metrics;
use crate::routing::Router as GatewayRouter;
use crate::upstream::ForwarderError;

/// Failure to assemble the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Forwarder(#[from] ForwarderError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<GatewayRouter>,
    pub gateway: Arc<Gateway>,
}

/// HTTP server for the booking gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server. Configuration is injected here and never re-read.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let state = AppState {
            routes: Arc::new(GatewayRouter::from_config(&config.routes)),
            gateway: Arc::new(Gateway::new(&config)?),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/gateway/status", get(gateway_status))
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.config.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main gateway handler.
/// Looks up the route and runs the request through the gateway.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let Some(route) = state.routes.match_request(&request) else {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, "No route matched");
        metrics::record_request("none", &method, 404, start_time);
        return EnvelopeResponse::new(
            StatusCode::NOT_FOUND,
            ResponseEnvelope::failure(format!("No gateway route for {path}")),
        )
        .into_response();
    };

    let response = match state.gateway.handle(route, request).await {
        Ok(envelope) => envelope.into_response(),
        Err(error) => {
            log_failure(&error, route.name(), &request_id, &method, &path);
            metrics::record_error(error.kind());
            error.into_response()
        }
    };

    metrics::record_request(route.name(), &method, response.status().as_u16(), start_time);
    response
}

fn log_failure(error: &GatewayError, route: &str, request_id: &str, method: &str, path: &str) {
    let kind = error.kind();
    match error {
        GatewayError::AuthMissing | GatewayError::UpstreamRejected { .. } => tracing::warn!(
            request_id = %request_id,
            route = %route,
            method = %method,
            path = %path,
            kind = %kind,
            status = error.status().as_u16(),
            error = %error,
            "Gateway request failed"
        ),
        GatewayError::UpstreamMalformed {
            status,
            content_type,
            excerpt,
        } => tracing::error!(
            request_id = %request_id,
            route = %route,
            method = %method,
            path = %path,
            kind = %kind,
            upstream_status = status.as_u16(),
            content_type = content_type.as_deref().unwrap_or("none"),
            excerpt = %excerpt,
            "Upstream returned an unparseable body"
        ),
        GatewayError::UpstreamUnreachable(_) | GatewayError::Internal(_) => tracing::error!(
            request_id = %request_id,
            route = %route,
            method = %method,
            path = %path,
            kind = %kind,
            error = %error,
            "Gateway request failed"
        ),
    }
}

async fn gateway_status() -> EnvelopeResponse {
    EnvelopeResponse::ok(ResponseEnvelope::success(
        None,
        Some(json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "status": "operational",
        })),
    ))
}

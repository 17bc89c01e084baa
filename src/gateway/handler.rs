//! Per-request composition of the gateway stages.
//!
//! ```text
//! Start → Extract Credential ──fail──▶ AuthMissing
//!       → Forward ─────────────fail──▶ UpstreamUnreachable
//!       → Normalize ───────────fail──▶ UpstreamMalformed | UpstreamRejected
//!       → [Post-Process rooms]
//!       → Success
//! ```
//!
//! No state is revisited and at most one upstream call is made.

use axum::body::Body;
use axum::http::{Request, StatusCode};

use crate::assets::AssetPolicy;
use crate::config::{GatewayConfig, PostProcess};
use crate::gateway::error::GatewayError;
use crate::http::request::request_id;
use crate::http::response::{EnvelopeResponse, ResponseEnvelope};
use crate::observability::metrics;
use crate::routing::Route;
use crate::security::credentials::CredentialExtractor;
use crate::upstream::{normalize, ForwarderError, InboundBody, UpstreamForwarder};

/// Composition root. Built once from config and shared read-only.
#[derive(Debug, Clone)]
pub struct Gateway {
    credentials: CredentialExtractor,
    forwarder: UpstreamForwarder,
    assets: AssetPolicy,
    max_body_size: usize,
}

impl Gateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, ForwarderError> {
        Ok(Self {
            credentials: CredentialExtractor::new(&config.credentials),
            forwarder: UpstreamForwarder::new(&config.upstream)?,
            assets: AssetPolicy::new(&config.assets),
            max_body_size: config.listener.max_body_size,
        })
    }

    /// Run one request through the gateway stages.
    pub async fn handle(
        &self,
        route: &Route,
        request: Request<Body>,
    ) -> Result<EnvelopeResponse, GatewayError> {
        let (parts, body) = request.into_parts();

        // Fail fast: the body is not read and upstream is not called without a token.
        let credential = self
            .credentials
            .extract(&parts.headers, route.credential_source())?;

        let inbound = InboundBody::read(&parts, body, route.body_mode(), self.max_body_size).await?;
        let outbound = self.forwarder.build(
            &parts.method,
            &route.upstream_path(parts.uri.path()),
            parts.uri.query(),
            &parts.headers,
            &credential,
            inbound,
        )?;

        tracing::debug!(
            request_id = %request_id(&parts.headers),
            route = %route.name(),
            method = %outbound.method(),
            url = %outbound.url(),
            "Forwarding to upstream"
        );

        let result = self.forwarder.send(outbound).await?;
        let mut payload = normalize(result)?;

        if route.post_process() == PostProcess::Rooms {
            if let Some(data) = payload.data.as_mut() {
                let substituted = self.assets.normalize_rooms(data);
                if substituted > 0 {
                    tracing::debug!(
                        request_id = %request_id(&parts.headers),
                        route = %route.name(),
                        substituted,
                        "Replaced unusable image references with fallback"
                    );
                    metrics::record_asset_substitutions(route.name(), substituted);
                }
            }
        }

        // 204/205 forbid a body; the envelope always has one.
        let status = match payload.status {
            StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT => StatusCode::OK,
            status => status,
        };

        Ok(EnvelopeResponse::new(
            status,
            ResponseEnvelope::success(payload.message, payload.data),
        ))
    }
}

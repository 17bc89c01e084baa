//! Outbound request construction and dispatch.
//!
//! # Responsibilities
//! - Read the inbound body as JSON (re-serialized) or pass multipart through as a stream
//! - Build an immutable `OutboundRequest` with the bearer credential attached
//! - Issue exactly one upstream call under an explicit deadline
//! - Buffer the upstream body up to a configured bound
//!
//! # Design Decisions
//! - `Content-Type` is never copied from the inbound request; the send step
//!   sets it from the body being sent (JSON, or the multipart body's own boundary)
//! - Multipart bodies are never buffered; the inbound size limit is enforced
//!   on the stream as it flows upstream
//! - GET forwards carry `Cache-Control: no-store`
//! - No retries: transport failures surface as `UpstreamUnreachable`
//! - Redirects are not followed; a 3xx is the upstream's answer
//! - Upstream paths holding dot segments are refused before a URL is built

use std::error::Error as _;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::BoxError;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::{BodyMode, UpstreamConfig};
use crate::gateway::error::GatewayError;
use crate::routing::matcher::is_dot_segment;
use crate::security::credentials::Credential;
use crate::upstream::normalizer::excerpt;

/// Failure to construct the forwarder at startup.
#[derive(Debug, Error)]
pub enum ForwarderError {
    #[error("invalid upstream base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Raised inside a multipart stream once it passes the inbound size limit.
#[derive(Debug, Error)]
#[error("request body exceeds {limit} bytes")]
pub struct BodyLimitExceeded {
    limit: usize,
}

/// A multipart body forwarded byte for byte, without buffering.
#[derive(Debug)]
pub struct MultipartBody {
    boundary: String,
    body: Body,
    limit: usize,
}

impl MultipartBody {
    pub fn new(boundary: impl Into<String>, body: Body, limit: usize) -> Self {
        Self {
            boundary: boundary.into(),
            body,
            limit,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Content type matching the boundary the body was encoded with.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// The raw body as a stream that fails with [`BodyLimitExceeded`] once
    /// more than `limit` bytes have passed through.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, BoxError>> + Send + 'static {
        let limit = self.limit;
        let mut seen = 0usize;
        self.body.into_data_stream().map(move |chunk| {
            let chunk = chunk.map_err(BoxError::from)?;
            seen += chunk.len();
            if seen > limit {
                return Err(BoxError::from(BodyLimitExceeded { limit }));
            }
            Ok(chunk)
        })
    }
}

/// Inbound body after reading.
#[derive(Debug)]
pub enum InboundBody {
    Empty,
    Json(Value),
    Multipart(MultipartBody),
}

impl InboundBody {
    /// Read the inbound body according to the route's body mode.
    ///
    /// JSON bodies are buffered and parsed; multipart bodies are only wrapped.
    pub async fn read(
        parts: &Parts,
        body: Body,
        mode: BodyMode,
        limit: usize,
    ) -> Result<Self, GatewayError> {
        let boundary = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(multipart_boundary);

        match (mode, boundary) {
            (BodyMode::Multipart | BodyMode::Auto, Some(boundary)) => {
                if let Some(length) = declared_length(&parts.headers).filter(|len| *len > limit) {
                    return Err(GatewayError::Internal(format!(
                        "request body of {length} bytes exceeds limit of {limit} bytes"
                    )));
                }
                Ok(InboundBody::Multipart(MultipartBody::new(boundary, body, limit)))
            }
            (BodyMode::Multipart, None) => Err(GatewayError::Internal(
                "expected a multipart/form-data body".to_string(),
            )),
            _ => {
                let bytes = axum::body::to_bytes(body, limit).await.map_err(|e| {
                    GatewayError::Internal(format!(
                        "failed to read request body (limit {limit} bytes): {e}"
                    ))
                })?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(InboundBody::Empty);
                }
                serde_json::from_slice(&bytes)
                    .map(InboundBody::Json)
                    .map_err(|e| {
                        GatewayError::Internal(format!("request body is not valid JSON: {e}"))
                    })
            }
        }
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Boundary of a `multipart/form-data` content type, if that is what it is.
pub fn multipart_boundary(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';');
    let mime = params.next()?.trim();
    if !mime.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    params
        .find_map(|param| {
            let (key, value) = param.trim().split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("boundary")
                .then(|| value.trim().trim_matches('"').to_string())
        })
        .filter(|boundary| !boundary.is_empty())
}

/// Body of an outbound request.
#[derive(Debug)]
pub enum OutboundBody {
    Empty,
    /// Re-serialized JSON.
    Json(Bytes),
    Multipart(MultipartBody),
}

/// A fully built upstream request. Immutable once built.
#[derive(Debug)]
pub struct OutboundRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: OutboundBody,
}

impl OutboundRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &OutboundBody {
        &self.body
    }
}

/// Raw upstream answer.
#[derive(Debug, Clone)]
pub struct UpstreamResult {
    pub status: StatusCode,
    pub body: Bytes,
    pub content_type: Option<String>,
}

/// Issues calls to the upstream API.
#[derive(Debug, Clone)]
pub struct UpstreamForwarder {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    max_response_bytes: usize,
}

impl UpstreamForwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ForwarderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.base_url)?,
            timeout: Duration::from_millis(config.timeout_ms),
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Resolve an upstream path against the base URL.
    ///
    /// Refuses paths with dot segments (plain or percent-encoded) and any
    /// result that would land outside the base path.
    pub fn target_url(&self, upstream_path: &str, query: Option<&str>) -> Result<Url, GatewayError> {
        if upstream_path.contains('\\') || upstream_path.split('/').any(is_dot_segment) {
            return Err(GatewayError::Internal(format!(
                "refusing upstream path with dot segments: {upstream_path}"
            )));
        }

        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base_path}{upstream_path}"));
        url.set_query(query);

        if !url.path().starts_with(&base_path) {
            return Err(GatewayError::Internal(format!(
                "upstream path escapes base path: {upstream_path}"
            )));
        }
        Ok(url)
    }

    /// Build the outbound request for one inbound call.
    pub fn build(
        &self,
        method: &Method,
        upstream_path: &str,
        query: Option<&str>,
        inbound_headers: &HeaderMap,
        credential: &Credential,
        body: InboundBody,
    ) -> Result<OutboundRequest, GatewayError> {
        let mut headers = forwardable_headers(inbound_headers);

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", credential.as_str()))
            .map_err(|_| GatewayError::Internal("credential is not a valid header value".into()))?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);

        if *method == Method::GET {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }

        let body = match body {
            InboundBody::Empty => OutboundBody::Empty,
            InboundBody::Json(value) => OutboundBody::Json(Bytes::from(
                serde_json::to_vec(&value)
                    .map_err(|e| GatewayError::Internal(format!("failed to encode body: {e}")))?,
            )),
            InboundBody::Multipart(multipart) => OutboundBody::Multipart(multipart),
        };

        Ok(OutboundRequest {
            method: method.clone(),
            url: self.target_url(upstream_path, query)?,
            headers,
            body,
        })
    }

    /// Send the request. Exactly one attempt, bounded by the configured deadline.
    pub async fn send(&self, request: OutboundRequest) -> Result<UpstreamResult, GatewayError> {
        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::UpstreamUnreachable(format!(
                "no complete response within {} ms",
                self.timeout.as_millis()
            ))),
        }
    }

    async fn exchange(&self, request: OutboundRequest) -> Result<UpstreamResult, GatewayError> {
        let OutboundRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let builder = self.client.request(method, url).headers(headers);
        let builder = match body {
            OutboundBody::Empty => builder,
            OutboundBody::Json(bytes) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(bytes),
            OutboundBody::Multipart(multipart) => builder
                .header(header::CONTENT_TYPE, multipart.content_type())
                .body(reqwest::Body::wrap_stream(multipart.into_stream())),
        };

        let mut response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
            if body.len() + chunk.len() > self.max_response_bytes {
                return Err(GatewayError::UpstreamMalformed {
                    status,
                    content_type,
                    excerpt: excerpt(&String::from_utf8_lossy(&body)),
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(UpstreamResult {
            status,
            body: Bytes::from(body),
            content_type,
        })
    }
}

fn transport_error(error: reqwest::Error) -> GatewayError {
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        // Upload over the inbound limit.
        if let Some(exceeded) = cause.downcast_ref::<BodyLimitExceeded>() {
            return GatewayError::Internal(exceeded.to_string());
        }
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    GatewayError::UpstreamUnreachable(detail)
}

/// End-to-end headers worth forwarding. Hop-by-hop headers, the inbound
/// credential carriers and the body framing headers are dropped.
fn forwardable_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if is_forwardable(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

fn is_forwardable(name: &HeaderName) -> bool {
    !matches!(
        name.as_str(),
        "host"
            | "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authorization"
            | "proxy-authenticate"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
            | "content-length"
            | "content-type"
            | "accept-encoding"
            | "authorization"
            | "cookie"
    )
}

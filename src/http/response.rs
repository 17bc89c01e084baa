//! Response envelope and its HTTP rendering.
//!
//! # Responsibilities
//! - Define the `{success, message?, data?}` envelope every caller receives
//! - Render it with a status, `Cache-Control: no-store` and, on failure,
//!   the `x-gateway-error` classification header
//!
//! # Design Decisions
//! - The envelope is the only body shape the gateway emits
//! - Classification travels in a header so the body shape stays fixed

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::error::ErrorKind;

/// Header carrying the [`ErrorKind`] of a failed request.
pub const X_GATEWAY_ERROR: &str = "x-gateway-error";

/// Uniform response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(message: Option<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message,
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// An envelope paired with the status it is sent with.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeResponse {
    pub status: StatusCode,
    pub envelope: ResponseEnvelope,
    pub error_kind: Option<ErrorKind>,
}

impl EnvelopeResponse {
    pub fn new(status: StatusCode, envelope: ResponseEnvelope) -> Self {
        Self {
            status,
            envelope,
            error_kind: None,
        }
    }

    pub fn ok(envelope: ResponseEnvelope) -> Self {
        Self::new(StatusCode::OK, envelope)
    }

    pub fn with_error_kind(mut self, kind: ErrorKind) -> Self {
        self.error_kind = Some(kind);
        self
    }
}

impl IntoResponse for EnvelopeResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.envelope)).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        if let Some(kind) = self.error_kind {
            headers.insert(X_GATEWAY_ERROR, HeaderValue::from_static(kind.as_str()));
        }
        response
    }
}

//! Error taxonomy and classification.
//!
//! Every failure on a gateway route ends up as exactly one [`GatewayError`],
//! which maps to one [`ErrorKind`] and one caller-facing status:
//!
//! | ErrorKind             | Status                      |
//! |-----------------------|-----------------------------|
//! | `AuthMissing`         | 401                         |
//! | `UpstreamUnreachable` | 500                         |
//! | `UpstreamMalformed`   | 500                         |
//! | `UpstreamRejected`    | upstream status, verbatim   |
//! | `InternalFailure`     | 500                         |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::http::response::{EnvelopeResponse, ResponseEnvelope};

/// Closed set of failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthMissing,
    UpstreamUnreachable,
    UpstreamMalformed,
    UpstreamRejected,
    InternalFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthMissing => "auth_missing",
            ErrorKind::UpstreamUnreachable => "upstream_unreachable",
            ErrorKind::UpstreamMalformed => "upstream_malformed",
            ErrorKind::UpstreamRejected => "upstream_rejected",
            ErrorKind::InternalFailure => "internal_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures on a gateway route.
///
/// The `Display` text is diagnostic and only ever logged; callers see
/// [`GatewayError::public_message`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No bearer token in the header or cookie.
    #[error("no credential found")]
    AuthMissing,

    /// Connection refused, DNS failure, timeout, or a body read that broke off.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Upstream body could not be parsed.
    #[error("upstream returned unparseable body (status {status}): {excerpt}")]
    UpstreamMalformed {
        status: StatusCode,
        content_type: Option<String>,
        /// Bounded excerpt of the body, never the full payload.
        excerpt: String,
    },

    /// Upstream answered non-2xx with a parseable body.
    #[error("upstream rejected request with status {status}: {message}")]
    UpstreamRejected { status: StatusCode, message: String },

    /// Any other local fault.
    #[error("internal failure: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::AuthMissing => ErrorKind::AuthMissing,
            GatewayError::UpstreamUnreachable(_) => ErrorKind::UpstreamUnreachable,
            GatewayError::UpstreamMalformed { .. } => ErrorKind::UpstreamMalformed,
            GatewayError::UpstreamRejected { .. } => ErrorKind::UpstreamRejected,
            GatewayError::Internal(_) => ErrorKind::InternalFailure,
        }
    }

    /// Status returned to the caller. Only rejections pass the upstream status
    /// through; everything else originates in the gateway.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::AuthMissing => StatusCode::UNAUTHORIZED,
            GatewayError::UpstreamRejected { status, .. } => *status,
            GatewayError::UpstreamUnreachable(_)
            | GatewayError::UpstreamMalformed { .. }
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short message safe to put in the envelope.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::AuthMissing => "Authentication required".to_string(),
            GatewayError::UpstreamUnreachable(_) => "Upstream service unavailable".to_string(),
            GatewayError::UpstreamMalformed { .. } => {
                "Invalid response from upstream service".to_string()
            }
            GatewayError::UpstreamRejected { message, .. } => message.clone(),
            GatewayError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        EnvelopeResponse::new(
            self.status(),
            ResponseEnvelope::failure(self.public_message()),
        )
        .with_error_kind(self.kind())
        .into_response()
    }
}

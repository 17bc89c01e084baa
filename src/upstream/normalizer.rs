//! Defensive parsing of upstream responses.
//!
//! # Responsibilities
//! - Read the upstream body as text first, never assuming JSON
//! - Turn unparseable bodies into `UpstreamMalformed` with a bounded excerpt
//! - Turn parseable non-2xx answers into `UpstreamRejected`
//! - Lift `data`/`message` out of upstream bodies shaped like an envelope
//!
//! # Design Decisions
//! - Excerpts are capped at [`EXCERPT_LIMIT`] characters; large HTML error
//!   pages never reach logs or callers in full
//! - An empty body is "no content", not a parse failure

use axum::http::StatusCode;
use serde_json::Value;

use crate::gateway::error::GatewayError;
use crate::upstream::forwarder::UpstreamResult;

/// Maximum characters of an upstream body kept for diagnostics.
pub const EXCERPT_LIMIT: usize = 500;

/// Parsed body of a successful upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamPayload {
    pub status: StatusCode,
    pub message: Option<String>,
    pub data: Option<Value>,
}

/// First [`EXCERPT_LIMIT`] characters of `text`, cut on a char boundary.
pub fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_LIMIT).collect()
}

/// Classify and parse an upstream result.
pub fn normalize(result: UpstreamResult) -> Result<UpstreamPayload, GatewayError> {
    let UpstreamResult {
        status,
        body,
        content_type,
    } = result;

    let text = String::from_utf8_lossy(&body);
    let parsed = if text.trim().is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Some(value),
            Err(_) => {
                return Err(GatewayError::UpstreamMalformed {
                    status,
                    content_type,
                    excerpt: excerpt(&text),
                })
            }
        }
    };

    if !status.is_success() {
        let message = parsed
            .as_ref()
            .and_then(upstream_message)
            .map(excerpt)
            .unwrap_or_else(|| generic_reason(status));
        return Err(GatewayError::UpstreamRejected { status, message });
    }

    Ok(lift(status, parsed))
}

fn upstream_message(body: &Value) -> Option<&str> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|m| !m.is_empty())
}

fn generic_reason(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("Upstream request failed: {} {}", status.as_u16(), reason),
        None => format!("Upstream request failed with status {}", status.as_u16()),
    }
}

fn lift(status: StatusCode, parsed: Option<Value>) -> UpstreamPayload {
    match parsed {
        Some(Value::Object(mut map)) if map.contains_key("data") => {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned);
            UpstreamPayload {
                status,
                message,
                data: map.remove("data"),
            }
        }
        other => UpstreamPayload {
            status,
            message: None,
            data: other,
        },
    }
}

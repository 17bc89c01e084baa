//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0, addresses parse)
//! - Check routes are well-formed and uniquely named
//! - Check the asset fallback passes its own asset policy
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;
use url::Url;

use crate::assets::AssetPolicy;
use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url '{0}' is not an absolute http(s) URL")]
    InvalidUpstreamUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("{field} '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("credentials.cookie_name must not be empty")]
    EmptyCookieName,

    #[error("assets.trusted_hosts must not be empty")]
    NoTrustedHosts,

    #[error("assets.fallback_url '{0}' must be a non-placeholder http(s) URL on a trusted host")]
    UntrustedFallback(String),

    #[error("route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },

    #[error("route name '{0}' is used more than once")]
    DuplicateRoute(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("listener.max_body_size"));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidUpstreamUrl(
            config.upstream.base_url.clone(),
        )),
    }
    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("upstream.timeout_ms"));
    }
    if config.upstream.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("upstream.connect_timeout_ms"));
    }
    if config.upstream.max_response_bytes == 0 {
        errors.push(ValidationError::ZeroValue("upstream.max_response_bytes"));
    }

    if config.credentials.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }

    validate_assets(config, &mut errors);
    validate_routes(config, &mut errors);

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_assets(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let assets = &config.assets;
    if assets.trusted_hosts.is_empty() {
        errors.push(ValidationError::NoTrustedHosts);
    }

    if !AssetPolicy::new(assets).is_renderable(&assets.fallback_url) {
        errors.push(ValidationError::UntrustedFallback(assets.fallback_url.clone()));
    }
}

fn validate_routes(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();

    for route in &config.routes {
        let invalid = |reason: String| ValidationError::InvalidRoute {
            route: route.name.clone(),
            reason,
        };

        if route.name.trim().is_empty() {
            errors.push(invalid("name must not be empty".to_string()));
        } else if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        if !route.path_prefix.starts_with('/') {
            errors.push(invalid(format!(
                "path_prefix '{}' must start with '/'",
                route.path_prefix
            )));
        }
        if !route.upstream_prefix.starts_with('/') {
            errors.push(invalid(format!(
                "upstream_prefix '{}' must start with '/'",
                route.upstream_prefix
            )));
        }
        for method in &route.methods {
            if method.parse::<Method>().is_err() {
                errors.push(invalid(format!("'{}' is not an HTTP method", method)));
            }
        }
    }
}

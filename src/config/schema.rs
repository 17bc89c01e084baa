//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default upstream used when neither the environment nor the file sets one.
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:5000/api";

/// Root configuration for the booking gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, inbound limits).
    pub listener: ListenerConfig,

    /// Upstream REST API settings.
    pub upstream: UpstreamConfig,

    /// Where bearer credentials are looked up.
    pub credentials: CredentialConfig,

    /// Asset reference policy for room payloads.
    pub assets: AssetConfig,

    /// Route definitions mapping inbound paths to upstream paths.
    pub routes: Vec<RouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            credentials: CredentialConfig::default(),
            assets: AssetConfig::default(),
            routes: default_routes(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10MB, room photos
        }
    }
}

/// Upstream REST API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL every route is resolved against.
    pub base_url: String,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Deadline for the whole upstream exchange, body included, in milliseconds.
    pub timeout_ms: u64,

    /// Upper bound on the upstream body the gateway will buffer.
    pub max_response_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            connect_timeout_ms: 5_000,
            timeout_ms: 30_000,
            max_response_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Credential lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Cookie holding the session token.
    pub cookie_name: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            cookie_name: "token".to_string(),
        }
    }
}

/// Asset reference policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Hosts an image URL must point at to be kept as-is.
    pub trusted_hosts: Vec<String>,

    /// Paths of local placeholder images the front end ships with.
    pub placeholder_paths: Vec<String>,

    /// Fixed, versioned image served whenever a reference is rejected.
    pub fallback_url: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            trusted_hosts: vec!["res.cloudinary.com".to_string()],
            placeholder_paths: vec![
                "/placeholder.jpg".to_string(),
                "/placeholder.png".to_string(),
                "/images/placeholder.jpg".to_string(),
                "/images/default-room.jpg".to_string(),
            ],
            fallback_url:
                "https://res.cloudinary.com/booking/image/upload/v1700000000/rooms/fallback-room.jpg"
                    .to_string(),
        }
    }
}

/// How the inbound body is read and forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    /// Multipart when the content type says so, JSON otherwise.
    #[default]
    Auto,
    Json,
    Multipart,
}

/// Which inbound source may carry the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// `Authorization` header first, then the session cookie.
    #[default]
    Any,
    Header,
    Cookie,
}

/// Domain post-processing applied to successful payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostProcess {
    #[default]
    None,
    /// Room listings: image references are checked against the asset policy.
    Rooms,
}

/// Route configuration mapping inbound paths to the upstream API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Inbound path prefix to match (segment-aware).
    pub path_prefix: String,

    /// Upstream path prefix replacing `path_prefix`.
    pub upstream_prefix: String,

    /// Allowed methods; empty allows any.
    #[serde(default)]
    pub methods: Vec<String>,

    #[serde(default)]
    pub body: BodyMode,

    #[serde(default)]
    pub credential: CredentialSource,

    #[serde(default)]
    pub post_process: PostProcess,

    /// Route priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,
}

impl RouteConfig {
    fn forward(name: &str, path_prefix: &str, upstream_prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            path_prefix: path_prefix.to_string(),
            upstream_prefix: upstream_prefix.to_string(),
            methods: Vec::new(),
            body: BodyMode::Auto,
            credential: CredentialSource::Any,
            post_process: PostProcess::None,
            priority: 0,
        }
    }
}

/// Routes of the booking site front end.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            post_process: PostProcess::Rooms,
            priority: 10,
            ..RouteConfig::forward("admin-rooms", "/api/admin/rooms", "/admin/rooms")
        },
        RouteConfig::forward("admin", "/api/admin", "/admin"),
        RouteConfig {
            post_process: PostProcess::Rooms,
            ..RouteConfig::forward("rooms", "/api/rooms", "/rooms")
        },
        RouteConfig::forward("bookings", "/api/bookings", "/bookings"),
        RouteConfig::forward("users", "/api/users", "/users"),
        RouteConfig {
            methods: vec!["POST".to_string()],
            body: BodyMode::Multipart,
            ..RouteConfig::forward("uploads", "/api/uploads", "/uploads")
        },
    ]
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty for development, JSON for log shipping.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

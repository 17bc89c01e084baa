//! Authenticated backend gateway for the booking site.
//!
//! Sits between the browser and the upstream REST API: attaches the caller's
//! bearer credential, forwards the call, and always answers with a
//! `{success, message?, data?}` envelope.

pub mod assets;
pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use gateway::{ErrorKind, Gateway, GatewayError};
pub use http::{GatewayServer, ResponseEnvelope};
pub use lifecycle::Shutdown;

//! Authenticated backend gateway.
//!
//! # Data Flow
//! ```text
//! inbound request (route already matched)
//!     → security::credentials (bearer header / cookie, fail fast)
//!     → upstream::forwarder (one call, explicit deadline)
//!     → upstream::normalizer (text first, JSON second)
//!     → assets (rooms only)
//!     → EnvelopeResponse, or GatewayError rendered as an envelope
//! ```
//!
//! # Design Decisions
//! - Stateless per request; shared components are read-only
//! - Every failure is converted at this boundary; nothing escapes unstructured
//! - Dropping the request future (caller went away) drops the upstream call

pub mod error;
pub mod handler;

pub use error::{ErrorKind, GatewayError};
pub use handler::Gateway;

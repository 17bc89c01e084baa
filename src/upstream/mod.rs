//! Upstream exchange subsystem.
//!
//! # Data Flow
//! ```text
//! inbound parts + body + credential
//!     → forwarder.rs (InboundBody::read, build OutboundRequest, send once)
//!     → UpstreamResult {status, raw bytes, content type}
//!     → normalizer.rs (text first, then JSON; classify non-2xx)
//!     → UpstreamPayload {status, message, data}
//! ```
//!
//! # Design Decisions
//! - Exactly one network call per inbound request, never retried
//! - The upstream deadline covers connect, headers and body
//! - Raw upstream bodies never leave this subsystem unparsed

pub mod forwarder;
pub mod normalizer;

pub use forwarder::{
    ForwarderError, InboundBody, MultipartBody, OutboundBody, OutboundRequest, UpstreamForwarder,
    UpstreamResult,
};
pub use normalizer::{normalize, UpstreamPayload, EXCERPT_LIMIT};

//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (matched route):
//!     → credentials.rs (bearer header or session cookie, per route source)
//!     → Credential threaded through the rest of the request
//! ```
//!
//! # Design Decisions
//! - Fail closed: no token, no upstream call
//! - No trust decisions here; the upstream validates the token
//! - Tokens never appear in Debug output or logs

pub mod credentials;

pub use credentials::{Credential, CredentialExtractor};

//! Asset reference post-processing for room payloads.
//!
//! # Data Flow
//! ```text
//! successful upstream data (route post_process = "rooms")
//!     → rooms.rs (walk single room / room list / page of rooms)
//!     → policy.rs (per reference: empty, placeholder, untrusted host → fallback)
//!     → rewritten data + substitution count (logged and counted)
//! ```
//!
//! # Design Decisions
//! - Entries of a `rooms` array are rooms; other objects only when they carry
//!   `imageUrl` or `images`
//! - Substitution is silent towards the caller; it shows up in logs and metrics
//! - The fallback is a fixed, versioned URL from config, shared read-only
//! - Nothing is cached: references are re-checked on every response

pub mod policy;
pub mod rooms;

pub use policy::AssetPolicy;

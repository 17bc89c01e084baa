//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → routing layer picks the route
//!     → gateway runs credential → forward → normalize → post-process
//!     → response.rs (envelope, status, headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use response::{EnvelopeResponse, ResponseEnvelope, X_GATEWAY_ERROR};
pub use server::{AppState, GatewayServer, ServerError};

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → routing::classify (reserved path or protected)
//!     → auth (session cookie, login form)
//!     → upstream::forwarder or a locally generated response (response.rs, pages.rs)
//!     → Send to client
//! ```

pub mod body;
pub mod pages;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};

//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! Authenticated request
//!     → forwarder.rs (URL rewrite, header hygiene, streamed body)
//!     → upstream origin (HTTP or HTTPS, optional insecure TLS)
//!     → streamed response back to the client
//! ```
//!
//! # Design Decisions
//! - Exactly one origin for the process lifetime
//! - No retries: one attempt, failures are a generic 502

pub mod forwarder;

pub use forwarder::{ForwardError, Forwarder};

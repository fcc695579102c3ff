//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → classify.rs (ordered exact-path table)
//!     → Return: RequestClass
//!
//! Table Compilation (at startup):
//!     PathsConfig
//!     → [metrics, ready, authorize, failed] in priority order
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime
//! - Deterministic: same input always yields the same class
//! - First match wins; the fallthrough is Protected

pub mod classify;

pub use classify::{RequestClass, RouteTable};

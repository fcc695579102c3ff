//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (request counter, duration histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics path (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs and to the upstream
//! - Metrics are cheap (atomic increments)
//! - Only Protected requests are measured

pub mod logging;
pub mod metrics;

pub use metrics::{MetricsRecorder, MetricsSample, RequestLabels};

//! Crate-level error types.
//!
//! Only configuration and transport errors are fatal. Authentication failures
//! never surface here; the router absorbs them into redirects and status codes.

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors that abort startup or stop the server.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The listener could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// The upstream HTTP client could not be constructed.
    #[error("upstream client error: {0}")]
    UpstreamClient(#[source] reqwest::Error),

    /// The metrics registry could not be constructed.
    #[error("metrics registry error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick human or JSON output from config
//!
//! # Design Decisions
//! - RUST_LOG, when set, overrides the configured level
//! - Credentials, secret keys and session tokens are never logged

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(&config.log_level).into());

    let pretty = (config.log_format == LogFormat::Pretty).then(fmt::layer);
    let json = (config.log_format == LogFormat::Json).then(|| fmt::layer().json());

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

fn default_directives(level: &str) -> String {
    format!("authrp={level},tower_http={level}")
}

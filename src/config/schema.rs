//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, drain period).
    pub listener: ListenerConfig,

    /// The single protected upstream origin.
    pub upstream: UpstreamConfig,

    /// Credentials, session signing key and page title.
    pub auth: AuthConfig,

    /// Reserved gateway paths.
    pub paths: PathsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:80").
    pub bind_address: String,

    /// Seconds in-flight requests may take to finish after a shutdown signal.
    pub drain_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:80".to_string(),
            drain_secs: 10,
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Absolute URL of the upstream origin (e.g., "http://127.0.0.1:3000").
    pub target: String,

    /// Skip TLS certificate verification for the upstream.
    pub insecure: bool,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            insecure: false,
            connect_timeout_secs: 30,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// The only accepted username.
    pub username: String,

    /// The only accepted password.
    pub password: String,

    /// HMAC key for session tokens. Generated at startup when empty.
    pub secret_key: String,

    /// Title shown on the login and failure pages.
    pub title: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            secret_key: String::new(),
            title: "Protected by AuthRP".to_string(),
        }
    }
}

/// Reserved paths served by the gateway itself.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub metrics: String,
    pub ready: String,
    pub authorize: String,
    pub failed: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            metrics: "/__metrics".to_string(),
            ready: "/__ready".to_string(),
            authorize: "/__authorize".to_string(),
            failed: "/__failed".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Enforce the required values: upstream target, username, password
//! - Validate value shapes (host:port, absolute URL, reserved paths)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("AUTHRP_TARGET is required")]
    MissingTarget,

    #[error("upstream target {0:?} is not an absolute http(s) URL")]
    InvalidTarget(String),

    #[error("AUTHRP_USERNAME is required")]
    MissingUsername,

    #[error("AUTHRP_PASSWORD is required")]
    MissingPassword,

    #[error("listen address {0:?} is not of the form host:port")]
    InvalidListen(String),

    #[error("{name} path {path:?} must start with '/'")]
    InvalidPath { name: &'static str, path: String },

    #[error("path {0:?} is reserved more than once")]
    DuplicatePath(String),
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let target = config.upstream.target.trim();
    if target.is_empty() {
        errors.push(ValidationError::MissingTarget);
    } else {
        match Url::parse(target) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => errors.push(ValidationError::InvalidTarget(target.to_string())),
        }
    }

    if config.auth.username.is_empty() {
        errors.push(ValidationError::MissingUsername);
    }
    if config.auth.password.is_empty() {
        errors.push(ValidationError::MissingPassword);
    }

    if !is_host_port(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidListen(
            config.listener.bind_address.clone(),
        ));
    }

    let paths = [
        ("metrics", &config.paths.metrics),
        ("ready", &config.paths.ready),
        ("authorize", &config.paths.authorize),
        ("failed", &config.paths.failed),
    ];
    for (i, (name, path)) in paths.iter().enumerate() {
        if !path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                name: *name,
                path: path.to_string(),
            });
        }
        if paths[..i].iter().any(|(_, earlier)| earlier == path) {
            errors.push(ValidationError::DuplicatePath(path.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a numeric port. The host may be a name, an IPv4
/// address or a bracketed IPv6 address; resolution happens at bind time.
fn is_host_port(address: &str) -> bool {
    let Some((host, port)) = address.rsplit_once(':') else {
        return false;
    };
    if host.is_empty() || port.parse::<u16>().is_err() {
        return false;
    }
    match host.strip_prefix('[') {
        Some(inner) => inner.strip_suffix(']').is_some_and(|ip| !ip.is_empty()),
        None => !host.contains(':') && !host.contains(char::is_whitespace),
    }
}

//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use rand::RngCore;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Prefix shared by every environment variable the gateway reads.
pub const ENV_PREFIX: &str = "AUTHRP_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {key}")]
    Env { key: String, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Something the loader noticed that should be logged once logging is up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigNotice {
    #[error("ignoring unparseable {key}={value:?}")]
    IgnoredEnv { key: String, value: String },

    #[error("no secret key configured, generated one for this process")]
    GeneratedSecretKey,
}

/// A validated configuration plus the notices raised while building it.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: GatewayConfig,
    pub notices: Vec<ConfigNotice>,
}

impl LoadedConfig {
    /// Emit the notices. Call after the tracing subscriber is installed.
    pub fn log_notices(&self) {
        for notice in &self.notices {
            match notice {
                ConfigNotice::IgnoredEnv { .. } => tracing::warn!("{}", notice),
                ConfigNotice::GeneratedSecretKey => tracing::info!("{}", notice),
            }
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, merge and validate the configuration.
///
/// Sources in increasing precedence: defaults, the optional TOML file, then
/// `AUTHRP_*` environment variables. A missing secret key is generated.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => GatewayConfig::default(),
    };

    let notices = apply_env(&mut config, |key| std::env::var(key).ok())?;
    finalize(config, notices)
}

/// Parse a TOML configuration file without validating it.
pub fn load_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Normalize, validate and fill in the generated secret key.
pub fn finalize(
    mut config: GatewayConfig,
    mut notices: Vec<ConfigNotice>,
) -> Result<LoadedConfig, ConfigError> {
    config.listener.bind_address = normalize_listen(&config.listener.bind_address);

    validate_config(&config).map_err(ConfigError::Validation)?;

    if config.auth.secret_key.is_empty() {
        config.auth.secret_key = generate_secret_key();
        notices.push(ConfigNotice::GeneratedSecretKey);
    }

    Ok(LoadedConfig { config, notices })
}

/// Overlay environment variables onto `config`.
///
/// Empty values count as unset. `lookup` receives the full variable name.
/// Values that are ignored rather than rejected come back as notices.
pub fn apply_env<F>(config: &mut GatewayConfig, lookup: F) -> Result<Vec<ConfigNotice>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut notices = Vec::new();
    let get = |name: &str| {
        lookup(&format!("{ENV_PREFIX}{name}")).filter(|value| !value.is_empty())
    };

    if let Some(title) = get("TITLE") {
        config.auth.title = title;
    }
    if let Some(listen) = get("LISTEN") {
        config.listener.bind_address = listen;
    }
    if let Some(target) = get("TARGET") {
        config.upstream.target = target;
    }
    if let Some(insecure) = get("TARGET_INSECURE") {
        match parse_bool(&insecure) {
            Some(flag) => config.upstream.insecure = flag,
            None => notices.push(ConfigNotice::IgnoredEnv {
                key: format!("{ENV_PREFIX}TARGET_INSECURE"),
                value: insecure,
            }),
        }
    }
    if let Some(secret_key) = get("SECRET_KEY") {
        config.auth.secret_key = secret_key;
    }
    if let Some(username) = get("USERNAME") {
        config.auth.username = username;
    }
    if let Some(password) = get("PASSWORD") {
        config.auth.password = password;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = get("LOG_FORMAT") {
        config.observability.log_format = match format.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::Env {
                    key: format!("{ENV_PREFIX}LOG_FORMAT"),
                    value: format,
                })
            }
        };
    }

    Ok(notices)
}

/// Accepts the boolean spellings operators commonly use in env files.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// `:8080` binds every interface.
fn normalize_listen(address: &str) -> String {
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}

/// 16 random bytes, hex encoded.
fn generate_secret_key() -> String {
    let mut buf = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

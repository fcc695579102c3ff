//! authrp: authenticating reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ routing::classify
//!                                          │
//!                 ┌────────────────────────┼──────────────────────────┐
//!                 ▼                        ▼                          ▼
//!        metrics / ready           login page / form           protected path
//!        (local response)          (auth: credentials,         (auth: verify cookie)
//!                                   token, cookie)                   │
//!                                                                    ▼
//!     Client Response ◀───────────────────────────────── upstream::forwarder ◀── Origin
//! ```
//!
//! Configuration comes from `AUTHRP_*` environment variables, optionally
//! layered over a TOML file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use authrp::config::load_config;
use authrp::lifecycle::{signals, startup, Shutdown};
use authrp::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "authrp")]
#[command(about = "Authenticating reverse proxy", long_about = None)]
struct Cli {
    /// TOML config file; environment variables override its values
    #[arg(short, long, env = "AUTHRP_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match load_config(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("authrp: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&loaded.config.observability);
    tracing::info!("authrp v{} starting", env!("CARGO_PKG_VERSION"));
    loaded.log_notices();
    let config = loaded.config;

    if cli.check {
        tracing::info!("Configuration is valid");
        return ExitCode::SUCCESS;
    }

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    match startup::run(config, &shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener for the validated listen address
//! - Build the server and its collaborators
//! - Run until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, after every collaborator is built

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;

/// Bind the configured listen address.
pub async fn bind_listener(address: &str) -> Result<TcpListener, GatewayError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| GatewayError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Build the gateway from `config` and serve until `shutdown` fires.
pub async fn run(config: GatewayConfig, shutdown: &Shutdown) -> Result<(), GatewayError> {
    tracing::info!(
        listen = %config.listener.bind_address,
        target = %config.upstream.target,
        insecure = config.upstream.insecure,
        title = %config.auth.title,
        username = %config.auth.username,
        metrics_path = %config.paths.metrics,
        ready_path = %config.paths.ready,
        authorize_path = %config.paths.authorize,
        failed_path = %config.paths.failed,
        "Configuration loaded"
    );

    let server = HttpServer::new(config)?;
    let listener = bind_listener(&server.config().listener.bind_address).await?;
    server.run(listener, shutdown.subscribe()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = taken.local_addr().unwrap().to_string();

        match bind_listener(&address).await {
            Err(GatewayError::Bind { address: reported, .. }) => assert_eq!(reported, address),
            other => panic!("expected bind error, got {:?}", other.map(|_| ())),
        }
    }
}

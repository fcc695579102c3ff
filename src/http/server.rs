//! HTTP server setup and the request state machine.
//!
//! # Responsibilities
//! - Create the Axum Router with one catch-all handler
//! - Wire up middleware (request ID, tracing)
//! - Classify each request and dispatch it: metrics, ready, login page,
//!   login submission, failure page, or protected passthrough
//! - Record metrics for protected requests, timing forwarded ones until
//!   the response body is done
//! - Serve until shutdown, then drain in-flight requests

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{FromRequest, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Form, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use url::form_urlencoded;

use crate::auth::{session_cookie, session_token, Credentials, TokenService};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::body::CompletionStream;
use crate::http::pages::Pages;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response;
use crate::observability::metrics::{
    MetricsRecorder, MetricsSample, RequestLabels, EXPOSITION_CONTENT_TYPE,
};
use crate::routing::{RequestClass, RouteTable};
use crate::upstream::Forwarder;

/// Application state injected into the handler.
///
/// Everything here is read-only after startup except the metrics registry,
/// whose contents change through atomic updates.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub tokens: Arc<TokenService>,
    pub credentials: Arc<Credentials>,
    pub forwarder: Arc<Forwarder>,
    pub metrics: Arc<MetricsRecorder>,
    pub pages: Arc<Pages>,
}

impl AppState {
    /// Build every collaborator from a validated config.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            routes: Arc::new(RouteTable::new(&config.paths)),
            tokens: Arc::new(TokenService::new(&config.auth.secret_key)),
            credentials: Arc::new(Credentials::new(
                config.auth.username.clone(),
                config.auth.password.clone(),
            )),
            forwarder: Arc::new(Forwarder::new(&config.upstream)?),
            metrics: Arc::new(MetricsRecorder::new()?),
            pages: Arc::new(Pages::render(&config.auth.title)),
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        request_id = %request_id(request.headers()),
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared state, exposing the metrics registry.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// After `shutdown` fires the listener stops accepting and in-flight
    /// requests get the configured drain period to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), GatewayError> {
        let addr = listener.local_addr().map_err(GatewayError::Serve)?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.forwarder.target(),
            "HTTP server starting"
        );

        let drain = Duration::from_secs(self.config.listener.drain_secs);
        let mut drain_started = shutdown.resubscribe();

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .into_future();

        tokio::select! {
            result = serve => result.map_err(GatewayError::Serve)?,
            _ = async {
                let _ = drain_started.recv().await;
                tokio::time::sleep(drain).await;
            } => {
                tracing::warn!(
                    drain_secs = drain.as_secs(),
                    "Drain period elapsed with requests still in flight"
                );
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Login form fields. Missing fields read as empty and fail the comparison.
#[derive(Debug, Default, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Classify the request and dispatch it.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started_at = Instant::now();
    let class = state
        .routes
        .classify(request.method(), request.uri().path());

    tracing::debug!(class = class.as_str(), "Request classified");

    match class {
        RequestClass::Metrics => metrics_exposition(&state),
        RequestClass::Ready => response::ready(),
        RequestClass::AuthorizeGet => {
            response::html_page(StatusCode::OK, state.pages.authorize.clone())
        }
        RequestClass::AuthorizePost => authorize(&state, request).await,
        RequestClass::Failed => {
            response::html_page(StatusCode::UNAUTHORIZED, state.pages.failed.clone())
        }
        RequestClass::Protected => protected(&state, request, started_at).await,
    }
}

fn metrics_exposition(state: &AppState) -> Response {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.metrics.render(),
    )
        .into_response()
}

/// Check submitted credentials; on success set the session cookie and
/// return the client to where it was going.
async fn authorize(state: &AppState, request: Request<Body>) -> Response {
    let destination = query_param(request.uri().query(), "redirect")
        .filter(|target| !target.is_empty())
        .unwrap_or_else(|| "/".to_string());

    let form = match Form::<LoginForm>::from_request(request, &()).await {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable login form");
            LoginForm::default()
        }
    };

    if !state.credentials.matches(&form.username, &form.password) {
        tracing::warn!("Login failed");
        return response::found(state.routes.failed_path());
    }

    match state.tokens.issue(state.credentials.username()) {
        Ok(token) => {
            tracing::info!("Login succeeded");
            let jar = CookieJar::new().add(session_cookie(token));
            (jar, response::found(&destination)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Could not issue session token");
            response::found(state.routes.failed_path())
        }
    }
}

/// Verify the session; forward when valid, otherwise send the client to the
/// login page. The request is counted up front; its duration is observed once
/// the response body has been fully sent, or immediately for local responses.
async fn protected(state: &AppState, request: Request<Body>, started_at: Instant) -> Response {
    let token = session_token(request.headers());
    let authenticated = state
        .tokens
        .verify(token.as_deref(), state.credentials.username());

    let labels = RequestLabels {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authenticated,
    };
    state.metrics.increment(&labels);

    let response = if authenticated {
        match state.forwarder.forward(request).await {
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), "Forwarded to upstream");
                let metrics = state.metrics.clone();
                return response.map(|body| {
                    Body::from_stream(CompletionStream::new(body.into_data_stream(), move || {
                        metrics.observe(&MetricsSample {
                            labels,
                            duration: started_at.elapsed(),
                        });
                    }))
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Upstream error");
                response::gateway_error(e.status())
            }
        }
    } else {
        response::login_redirect(state.routes.authorize_path(), request.uri())
    };

    tracing::debug!(
        authenticated,
        status = response.status().as_u16(),
        "Protected request handled"
    );

    state.metrics.observe(&MetricsSample {
        labels,
        duration: started_at.elapsed(),
    });

    response
}

fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

//! Reverse proxy to the single upstream origin.
//!
//! # Responsibilities
//! - Rewrite the request URL onto the configured target
//! - Preserve method, path, query, headers and body
//! - Strip hop-by-hop headers in both directions
//! - Stream the request body to the upstream and the response back
//!
//! # Design Decisions
//! - One attempt per request; failures surface immediately as 502
//! - Upstream redirects are relayed, never followed
//! - The inbound Host header is kept

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode, Uri},
    response::Response,
};
use thiserror::Error;
use url::Url;

use crate::config::loader::ConfigError;
use crate::config::validation::ValidationError;
use crate::config::UpstreamConfig;
use crate::error::GatewayError;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Reasons a request could not be forwarded.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),
}

impl ForwardError {
    /// Status shown to the client. Upstream causes are not distinguished.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Forwards authenticated requests to the upstream origin.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    target: Url,
}

impl Forwarder {
    /// Build the upstream client.
    ///
    /// `insecure` disables certificate verification for self-signed upstreams.
    pub fn new(config: &UpstreamConfig) -> Result<Self, GatewayError> {
        let target = Url::parse(config.target.trim()).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidTarget(config.target.clone())])
        })?;

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(GatewayError::UpstreamClient)?;

        if config.insecure {
            tracing::warn!(target = %target, "Upstream TLS certificate verification disabled");
        }

        Ok(Self { client, target })
    }

    /// The configured upstream origin.
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Forward one request and return the upstream response.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, ForwardError> {
        let (parts, body) = request.into_parts();

        let client_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        append_forwarded_for(&mut headers, client_ip);

        let url = self.upstream_url(&parts.uri);
        tracing::debug!(method = %parts.method, url = %url, "Forwarding to upstream");

        let upstream = self
            .client
            .request(parts.method, url)
            .headers(headers)
            .body(reqwest::Body::wrap_stream(body.into_data_stream()))
            .send()
            .await
            .map_err(ForwardError::Upstream)?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    /// Target origin + joined path + merged query.
    pub fn upstream_url(&self, uri: &Uri) -> Url {
        let mut url = self.target.clone();
        url.set_path(&join_paths(self.target.path(), uri.path()));

        let query = match (self.target.query().filter(|q| !q.is_empty()), uri.query()) {
            (Some(base), Some(extra)) if !extra.is_empty() => Some(format!("{base}&{extra}")),
            (Some(base), _) => Some(base.to_string()),
            (None, Some(extra)) => Some(extra.to_string()),
            (None, None) => None,
        };
        url.set_query(query.as_deref());
        url
    }
}

/// Join with exactly one slash between the two halves.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Remove hop-by-hop headers, including any named by `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, client_ip: Option<IpAddr>) {
    let Some(ip) = client_ip else {
        return;
    };

    let value = match headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        Some(prior) if !prior.is_empty() => format!("{}, {}", prior, ip),
        _ => ip.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert("x-forwarded-for", value);
    }
}

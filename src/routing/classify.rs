//! Request classification.
//!
//! # Responsibilities
//! - Map (method, path) to exactly one `RequestClass`
//! - Evaluate reserved paths in fixed priority order
//! - Send everything else to `Protected`
//!
//! # Design Decisions
//! - Exact string equality on the path; no prefixes, patterns or wildcards
//! - The table is built once from config and never changes
//! - First match wins: Metrics > Ready > Authorize > Failed > Protected

use axum::http::Method;

use crate::config::PathsConfig;

/// What the gateway does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Metrics exposition; no authentication.
    Metrics,
    /// Liveness probe; no authentication.
    Ready,
    /// Serve the login page.
    AuthorizeGet,
    /// Check submitted credentials.
    AuthorizePost,
    /// Serve the login failure page.
    Failed,
    /// Everything else: verify the session, then forward.
    Protected,
}

impl RequestClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Metrics => "metrics",
            RequestClass::Ready => "ready",
            RequestClass::AuthorizeGet => "authorize_get",
            RequestClass::AuthorizePost => "authorize_post",
            RequestClass::Failed => "failed",
            RequestClass::Protected => "protected",
        }
    }
}

/// Which entry in the table a path selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReservedRoute {
    Metrics,
    Ready,
    Authorize,
    Failed,
}

/// Ordered table of reserved paths.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<(String, ReservedRoute)>,
    authorize_path: String,
    failed_path: String,
}

impl RouteTable {
    /// Compile the table from configured paths, in priority order.
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            routes: vec![
                (paths.metrics.clone(), ReservedRoute::Metrics),
                (paths.ready.clone(), ReservedRoute::Ready),
                (paths.authorize.clone(), ReservedRoute::Authorize),
                (paths.failed.clone(), ReservedRoute::Failed),
            ],
            authorize_path: paths.authorize.clone(),
            failed_path: paths.failed.clone(),
        }
    }

    /// Classify a request. Total: every input yields a class.
    pub fn classify(&self, method: &Method, path: &str) -> RequestClass {
        let matched = self
            .routes
            .iter()
            .find(|(route_path, _)| route_path == path)
            .map(|(_, route)| *route);

        match matched {
            Some(ReservedRoute::Metrics) => RequestClass::Metrics,
            Some(ReservedRoute::Ready) => RequestClass::Ready,
            Some(ReservedRoute::Authorize) if *method == Method::POST => RequestClass::AuthorizePost,
            Some(ReservedRoute::Authorize) => RequestClass::AuthorizeGet,
            Some(ReservedRoute::Failed) => RequestClass::Failed,
            None => RequestClass::Protected,
        }
    }

    /// Path of the login page.
    pub fn authorize_path(&self) -> &str {
        &self.authorize_path
    }

    /// Path of the failure page.
    pub fn failed_path(&self) -> &str {
        &self.failed_path
    }
}

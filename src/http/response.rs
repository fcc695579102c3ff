//! Responses the gateway generates itself.
//!
//! # Responsibilities
//! - Cache-disabled HTML pages with explicit Content-Length
//! - 302 redirects, including the login redirect carrying the original URI
//! - Generic error bodies that do not reveal upstream causes

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use url::form_urlencoded;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Serve a pre-rendered page.
pub fn html_page(status: StatusCode, body: Bytes) -> Response {
    let length = body.len();
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_HTML));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    response
}

/// 302 to `location`. Falls back to `/` if the target is not a valid header value.
pub fn found(location: &str) -> Response {
    let location = HeaderValue::from_str(location).unwrap_or_else(|_| {
        tracing::debug!("Redirect target is not a valid header value, using /");
        HeaderValue::from_static("/")
    });
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// 302 to the login page with `redirect` set to the original request URI.
pub fn login_redirect(authorize_path: &str, original: &Uri) -> Response {
    let original = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let encoded: String = form_urlencoded::byte_serialize(original.as_bytes()).collect();
    found(&format!("{}?redirect={}", authorize_path, encoded))
}

/// Liveness response.
pub fn ready() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Generic error body for a failed forward.
pub fn gateway_error(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("Error");
    (status, reason).into_response()
}

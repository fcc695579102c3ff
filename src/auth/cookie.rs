//! Session cookie construction and extraction.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::auth::token::SESSION_TTL;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "__authrp";

/// Build the session cookie: `Path=/`, `HttpOnly`, `Max-Age=86400`.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(SESSION_TTL.as_secs() as i64))
        .build()
}

/// The session token sent by the client, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

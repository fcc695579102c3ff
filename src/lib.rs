//! Authenticating reverse proxy library.
//!
//! Puts a login page and a signed session cookie in front of one upstream
//! HTTP origin. Requests without a valid session are redirected to the login
//! page; authenticated requests are forwarded unchanged.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Login (POST authorize path):
//!     form fields → credentials.rs (compare with configured pair)
//!     → token.rs (issue signed token) → cookie.rs (Set-Cookie)
//!
//! Protected request:
//!     Cookie header → cookie.rs (extract token)
//!     → token.rs (verify signature, expiry, subject) → bool
//! ```
//!
//! # Design Decisions
//! - No server-side session state; the token is the session
//! - Fail closed: any verification problem means "not authenticated"
//! - Credential comparison is constant-time

pub mod cookie;
pub mod credentials;
pub mod token;

pub use cookie::{session_cookie, session_token, SESSION_COOKIE_NAME};
pub use credentials::Credentials;
pub use token::{TokenService, SESSION_TTL};

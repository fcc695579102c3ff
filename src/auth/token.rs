//! Stateless session tokens.
//!
//! A token is an HS256 JWT carrying `sub`, `iat` and `exp`. Validity is a pure
//! function of the token bytes and the secret key: there is no session store,
//! and rotating the key invalidates every outstanding token at once.
//!
//! Verification is fail-closed and boolean. Callers learn only "valid" or
//! "not valid", never which check failed.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long an issued token (and its cookie) stays valid.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The authenticated username.
    pub sub: String,
    /// Issued at (seconds since epoch).
    pub iat: u64,
    /// Expires at (seconds since epoch).
    pub exp: u64,
}

/// Reasons a token could not be issued or verified.
///
/// Only used for logging; the boolean `verify` contract hides it.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("token rejected: {0}")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,

    #[error("token subject does not match")]
    SubjectMismatch,
}

/// Issues and verifies signed session tokens with a process-wide key.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Build a service around the HMAC secret.
    pub fn new(secret_key: &str) -> Self {
        Self::with_ttl(secret_key, SESSION_TTL)
    }

    pub fn with_ttl(secret_key: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `check_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret_key.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issue a token for `subject`, valid from now.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, SystemTime::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, subject: &str, now: SystemTime) -> Result<String, TokenError> {
        let iat = unix_secs(now);
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat,
            exp: iat + self.ttl.as_secs(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Sign)
    }

    /// True only if `token` is present, well formed, signed with this key
    /// using HS256, unexpired, and issued to `expected_subject`.
    pub fn verify(&self, token: Option<&str>, expected_subject: &str) -> bool {
        self.verify_at(token, expected_subject, SystemTime::now())
    }

    /// `verify` evaluated at `now`.
    pub fn verify_at(&self, token: Option<&str>, expected_subject: &str, now: SystemTime) -> bool {
        let Some(token) = token else {
            return false;
        };

        match self.check_at(token, expected_subject, now) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(reason = %e, "Session token rejected");
                false
            }
        }
    }

    fn check_at(
        &self,
        token: &str,
        expected_subject: &str,
        now: SystemTime,
    ) -> Result<SessionClaims, TokenError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Decode)?
            .claims;

        if unix_secs(now) >= claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.sub != expected_subject {
            return Err(TokenError::SubjectMismatch);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn unix_secs(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

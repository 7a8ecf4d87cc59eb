//! Signed token issuance and verification.
//!
//! Three token families share one pattern: HS256-signed claims with an
//! embedded expiry, keyed by the process-wide `JWT_SIGNING_KEY`.
//!
//! - [`session`]: 24h tokens binding a storefront/dashboard session to a
//!   store (tenant id + shop domain).
//! - [`user`]: 24h tokens binding a request to a user (id + email +
//!   optional client context).
//! - [`state`]: 15m tokens carrying the claimed shop domain across the
//!   OAuth redirect boundary, the CSRF defense for the handshake.
//!
//! Verification always checks the signature before trusting any claim, then
//! re-checks expiry against the clock with zero leeway even though the
//! library validates it too. A token that fails either check is rejected
//! outright; there is no fallback.

/// Store session tokens
pub mod session;
/// OAuth state tokens
pub mod state;
/// User API tokens
pub mod user;

use chrono::{Duration, Utc};

/// TTL for store session and user tokens.
pub fn session_ttl() -> Duration {
    Duration::hours(24)
}

/// TTL for OAuth state tokens. Long enough for redirect retries, short
/// enough that a leaked state is useless within minutes.
pub fn state_ttl() -> Duration {
    Duration::minutes(15)
}

/// Why a token failed verification. All variants surface as a generic 401;
/// the distinction exists for logging.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("malformed token")]
    Malformed,

    #[error("token issuance failed")]
    Issuance,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Expiry check applied after signature verification, independent of the
/// library's own validation.
pub(crate) fn check_expiry(exp: i64) -> Result<(), TokenError> {
    if exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }
    Ok(())
}

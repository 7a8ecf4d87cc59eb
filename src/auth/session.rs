//! Store session tokens.
//!
//! A session token is a signed, time-boxed assertion that a request acts on
//! behalf of one store. It is verifiable without a database lookup: the
//! claims carry everything the middleware needs.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TokenError;

/// Claims embedded in a store session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Tenant this session is bound to
    pub store_id: Uuid,

    /// Shop domain, kept alongside the id for log context and display
    pub shop: String,

    /// Expiry (unix seconds)
    pub exp: i64,

    /// Issued-at (unix seconds)
    pub iat: i64,
}

/// Issue a signed session token for a store.
pub fn issue_session_token(
    store_id: Uuid,
    shop: &str,
    signing_key: &[u8],
    ttl: Duration,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = SessionClaims {
        store_id,
        shop: shop.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|_| TokenError::Issuance)
}

/// Verify a session token and return its claims.
///
/// Signature first, then an independent expiry check.
pub fn verify_session_token(token: &str, signing_key: &[u8]) -> Result<SessionClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<SessionClaims>(token, &DecodingKey::from_secret(signing_key), &validation)?;

    super::check_expiry(data.claims.exp)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-signing-secret";

    #[test]
    fn issue_and_verify() {
        let store_id = Uuid::new_v4();
        let token =
            issue_session_token(store_id, "acme.example.com", KEY, Duration::hours(24)).unwrap();

        let claims = verify_session_token(&token, KEY).unwrap();
        assert_eq!(claims.store_id, store_id);
        assert_eq!(claims.shop, "acme.example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token =
            issue_session_token(Uuid::new_v4(), "acme.example.com", KEY, Duration::hours(1))
                .unwrap();
        assert_eq!(
            verify_session_token(&token, b"other-secret"),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let token =
            issue_session_token(Uuid::new_v4(), "acme.example.com", KEY, Duration::seconds(-5))
                .unwrap();
        assert_eq!(verify_session_token(&token, KEY), Err(TokenError::Expired));
    }

    #[test]
    fn any_payload_mutation_breaks_verification() {
        let token =
            issue_session_token(Uuid::new_v4(), "acme.example.com", KEY, Duration::hours(1))
                .unwrap();

        // Flip one character in the payload segment.
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut payload: Vec<u8> = parts[1].clone().into_bytes();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        assert!(verify_session_token(&tampered, KEY).is_err());
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            verify_session_token("not-a-token", KEY),
            Err(TokenError::Malformed)
        );
    }
}

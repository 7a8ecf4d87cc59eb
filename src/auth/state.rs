//! OAuth state tokens.
//!
//! A state token asserts "this redirect was initiated by us for shop D".
//! It crosses the browser redirect boundary as the OAuth `state` parameter
//! and is the CSRF defense for the handshake. States are not persisted;
//! the short TTL bounds their useful life.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::TokenError;

/// Discriminating claim value. Session and user tokens share the signing
/// key, so without this a longer-lived token whose claims happen to
/// deserialize here could stand in for a state token.
const STATE_PURPOSE: &str = "oauth_state";

#[derive(Debug, Serialize, Deserialize)]
struct StateClaims {
    shop: String,
    purpose: String,
    exp: i64,
    iat: i64,
}

/// Issue a signed state token for a shop domain.
pub fn issue_state_token(shop: &str, signing_key: &[u8], ttl: Duration) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = StateClaims {
        shop: shop.to_string(),
        purpose: STATE_PURPOSE.to_string(),
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

/// Verify a state token and return the shop domain it was issued for.
///
/// The caller compares this against the shop the callback claims to be
/// from; a mismatch means the redirect was not initiated by us.
pub fn verify_state_token(token: &str, signing_key: &[u8]) -> Result<String, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<StateClaims>(token, &DecodingKey::from_secret(signing_key), &validation)?;

    if data.claims.purpose != STATE_PURPOSE {
        return Err(TokenError::Malformed);
    }
    super::check_expiry(data.claims.exp)?;
    Ok(data.claims.shop)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-signing-secret";

    #[test]
    fn round_trip_returns_shop() {
        let token = issue_state_token("acme.example.com", KEY, Duration::minutes(15)).unwrap();
        assert_eq!(verify_state_token(&token, KEY).unwrap(), "acme.example.com");
    }

    #[test]
    fn expired_state_is_rejected() {
        let token = issue_state_token("acme.example.com", KEY, Duration::seconds(-1)).unwrap();
        assert_eq!(verify_state_token(&token, KEY), Err(TokenError::Expired));
    }

    #[test]
    fn forged_state_is_rejected() {
        let token = issue_state_token("acme.example.com", b"attacker-key", Duration::minutes(15))
            .unwrap();
        assert_eq!(
            verify_state_token(&token, KEY),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn session_token_is_not_a_state_token() {
        // A 24h session token signed with the same key must not stretch the
        // state TTL for whoever holds it.
        let token = crate::auth::session::issue_session_token(
            uuid::Uuid::new_v4(),
            "acme.example.com",
            KEY,
            Duration::hours(24),
        )
        .unwrap();
        assert_eq!(verify_state_token(&token, KEY), Err(TokenError::Malformed));
    }
}

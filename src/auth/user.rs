//! User API tokens.
//!
//! Issued on registration and login; bind a request to a user id + email,
//! optionally scoped to one client organization.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TokenError;

/// Claims embedded in a user token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: Uuid,
    pub email: String,

    /// Present when the token was issued with a client context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,

    /// Expiry (unix seconds)
    pub exp: i64,

    /// Issued-at (unix seconds)
    pub iat: i64,

    /// Not-before (unix seconds)
    pub nbf: i64,
}

/// Issue a signed user token, optionally carrying a client context.
pub fn issue_user_token(
    user_id: Uuid,
    email: &str,
    client_id: Option<Uuid>,
    signing_key: &[u8],
    ttl: Duration,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = UserClaims {
        user_id,
        email: email.to_string(),
        client_id,
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        nbf: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|_| TokenError::Issuance)
}

/// Verify a user token and return its claims.
pub fn verify_user_token(token: &str, signing_key: &[u8]) -> Result<UserClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_nbf = true;

    let data = decode::<UserClaims>(token, &DecodingKey::from_secret(signing_key), &validation)?;

    super::check_expiry(data.claims.exp)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-signing-secret";

    #[test]
    fn issue_and_verify_without_client() {
        let user_id = Uuid::new_v4();
        let token =
            issue_user_token(user_id, "a@example.com", None, KEY, Duration::hours(24)).unwrap();

        let claims = verify_user_token(&token, KEY).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.client_id, None);
    }

    #[test]
    fn client_context_round_trips() {
        let client_id = Uuid::new_v4();
        let token = issue_user_token(
            Uuid::new_v4(),
            "a@example.com",
            Some(client_id),
            KEY,
            Duration::hours(1),
        )
        .unwrap();

        let claims = verify_user_token(&token, KEY).unwrap();
        assert_eq!(claims.client_id, Some(client_id));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_user_token(
            Uuid::new_v4(),
            "a@example.com",
            None,
            KEY,
            Duration::seconds(-1),
        )
        .unwrap();
        assert_eq!(verify_user_token(&token, KEY), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token =
            issue_user_token(Uuid::new_v4(), "a@example.com", None, KEY, Duration::hours(1))
                .unwrap();
        assert_eq!(
            verify_user_token(&token, b"wrong"),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn session_token_is_not_a_user_token() {
        // Claims from the store session family are missing user fields and
        // must fail deserialization, not be half-trusted.
        let token = crate::auth::session::issue_session_token(
            Uuid::new_v4(),
            "acme.example.com",
            KEY,
            Duration::hours(1),
        )
        .unwrap();
        assert_eq!(verify_user_token(&token, KEY), Err(TokenError::Malformed));
    }
}

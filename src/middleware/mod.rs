//! HTTP middleware.
//!
//! Each protected route group gets exactly one of these, and each one ends
//! by inserting a typed context into the request extensions for handlers
//! to extract. Rejections short-circuit with the generic 401/403 bodies
//! from [`crate::error`].

use axum::http::{HeaderMap, header};

/// API key authentication (clients)
pub mod api_key;
/// Optional shared-key guard for session storage
pub mod shared_key;
/// Store session token authentication
pub mod store_session;
/// User token authentication
pub mod user;

/// Extract a bearer token from the Authorization header.
///
/// The scheme match is case-insensitive; surrounding whitespace on the
/// token is trimmed.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, rest) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with_auth("Bearer abc123");
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let headers = headers_with_auth("bearer abc123");
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(bearer_token(&headers_with_auth("Basic abc123")), None);
        assert_eq!(bearer_token(&headers_with_auth("Bearer  ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}

//! API key authentication middleware.
//!
//! # Flow
//!
//! 1. Extract the raw key from `Authorization: Bearer` or `X-API-Key`
//!    (both forms are equivalent and resolve identically)
//! 2. Hash it with SHA-256 and look up the record by hash
//! 3. Validate the record: active flag, expiry
//! 4. Stamp `last_used_at` fire-and-forget
//! 5. Enforce the key <-> client binding against the `client_name` path
//!    segment: a valid key used in another client's namespace is a 403
//! 6. Inject `ClientContext` and continue
//!
//! Rejection reasons stay internal; the wire sees a generic 401 or 403.

use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    access,
    error::AppError,
    models::api_key::ApiKey,
    security::keys,
    services::api_keys,
    state::AppState,
};

/// Identity attached to requests authenticated by an API key.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub client_id: Uuid,
    pub client_name: String,
    pub api_key_id: Uuid,
    pub permissions: Vec<String>,
}

/// Key record joined with its owning client's name.
#[derive(Debug, sqlx::FromRow)]
struct KeyLookupRow {
    id: Uuid,
    client_id: Uuid,
    key_hash: String,
    name: String,
    key_prefix: String,
    permissions: Vec<String>,
    is_active: bool,
    last_used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    client_name: String,
}

impl KeyLookupRow {
    fn into_parts(self) -> (ApiKey, String) {
        let client_name = self.client_name;
        let key = ApiKey {
            id: self.id,
            client_id: self.client_id,
            key_hash: self.key_hash,
            name: self.name,
            key_prefix: self.key_prefix,
            permissions: self.permissions,
            is_active: self.is_active,
            last_used_at: self.last_used_at,
            created_at: self.created_at,
            expires_at: self.expires_at,
        };
        (key, client_name)
    }
}

pub async fn require_api_key(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw_key = extract_api_key(request.headers()).ok_or(AppError::Unauthenticated)?;

    // The lookup by hash is the hash-match check: an unknown hash simply
    // finds nothing.
    let key_hash = keys::hash_api_key(&raw_key);

    let row = sqlx::query_as::<_, KeyLookupRow>(
        r#"
        SELECT k.id, k.client_id, k.key_hash, k.name, k.key_prefix, k.permissions,
               k.is_active, k.last_used_at, k.created_at, k.expires_at,
               c.name AS client_name
        FROM api_keys k
        JOIN clients c ON c.id = k.client_id
        WHERE k.key_hash = $1 AND c.is_active = TRUE
        "#,
    )
    .bind(&key_hash)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| {
        tracing::debug!("api key lookup found no record");
        AppError::Unauthenticated
    })?;

    let (key, client_name) = row.into_parts();

    if let Err(rejection) = api_keys::validate(&key, Utc::now()) {
        tracing::debug!(key_id = %key.id, kind = %rejection, "api key rejected");
        return Err(AppError::Unauthenticated);
    }

    // Best-effort usage stamp; never blocks or fails the request.
    api_keys::touch_last_used(state.pool.clone(), key.id);

    // A valid key presented against another client's namespace must fail
    // with 403 regardless of the key's own validity.
    if let Some(requested) = params.get("client_name") {
        access::ensure_key_client_binding(&client_name, requested)?;
    }

    request.extensions_mut().insert(ClientContext {
        client_id: key.client_id,
        client_name,
        api_key_id: key.id,
        permissions: key.permissions,
    });

    Ok(next.run(request).await)
}

/// Extract the raw API key from either accepted header form.
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = super::bearer_token(headers) {
        return Some(token.to_string());
    }

    headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    #[test]
    fn bearer_and_x_api_key_resolve_identically() {
        let mut bearer = HeaderMap::new();
        bearer.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer raw-key-1"),
        );

        let mut dedicated = HeaderMap::new();
        dedicated.insert("x-api-key", HeaderValue::from_static("raw-key-1"));

        assert_eq!(extract_api_key(&bearer), extract_api_key(&dedicated));
    }

    #[test]
    fn authorization_header_wins_when_both_present() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-auth"),
        );
        headers.insert("x-api-key", HeaderValue::from_static("from-x-api-key"));
        assert_eq!(extract_api_key(&headers), Some("from-auth".to_string()));
    }

    #[test]
    fn missing_credential_yields_none() {
        assert_eq!(extract_api_key(&HeaderMap::new()), None);
    }
}

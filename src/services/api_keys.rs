//! API key issuance, validation, and usage tracking.
//!
//! Issuance generates the raw key, hashes it, persists only the hash plus
//! prefix, and hands the raw value back exactly once. The insert completes
//! before the response is sent; it is not detachable.
//!
//! Validation is a pure function over the fetched record; the hash match
//! already happened in the lookup, so what remains is the active flag and
//! expiry. The one asynchronous side effect, stamping `last_used_at`, runs
//! detached from the request with its own timeout and swallows failures:
//! it is observability data, not a correctness requirement.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::api_key::{ApiKey, CreateApiKeyRequest, CreatedApiKeyResponse};
use crate::security::keys;

/// Timeout for the detached last-used write, independent of the request's
/// own deadline.
const LAST_USED_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(3);

/// Why a fetched key record still fails validation.
///
/// Distinct kinds for logging; both collapse to a generic 401 on the wire.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiKeyRejection {
    #[error("api key is revoked")]
    Inactive,

    #[error("api key has expired")]
    Expired,
}

/// Validate a key record fetched by hash.
///
/// ALLOW requires the active flag set and, when an expiry exists, that it
/// is still in the future at `now`.
pub fn validate(key: &ApiKey, now: DateTime<Utc>) -> Result<(), ApiKeyRejection> {
    if !key.is_active {
        return Err(ApiKeyRejection::Inactive);
    }
    if let Some(expires_at) = key.expires_at
        && expires_at <= now
    {
        return Err(ApiKeyRejection::Expired);
    }
    Ok(())
}

/// Stamp `last_used_at` on a key, fire-and-forget.
///
/// Spawned detached from the request: its cancellation scope and timeout
/// are its own, and an error is logged, never surfaced.
pub fn touch_last_used(pool: DbPool, key_id: Uuid) {
    tokio::spawn(async move {
        let update = sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(key_id)
            .execute(&pool);

        match tokio::time::timeout(LAST_USED_TIMEOUT, update).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                tracing::warn!(%key_id, error = %err, "failed to update api key last_used_at");
            }
            Err(_) => {
                tracing::warn!(%key_id, "timed out updating api key last_used_at");
            }
        }
    });
}

/// Issue a new key for a client.
///
/// The returned response is the only place the raw key ever appears; the
/// database row holds hash + prefix + metadata.
pub async fn issue_for_client(
    pool: &DbPool,
    client_id: Uuid,
    request: CreateApiKeyRequest,
) -> Result<CreatedApiKeyResponse, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("key name is required".to_string()));
    }

    let raw_key = keys::generate_api_key(keys::DEFAULT_KEY_BYTES);
    let key_hash = keys::hash_api_key(&raw_key);
    let prefix = keys::key_prefix(&raw_key).to_string();

    let key_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO api_keys (client_id, key_hash, name, key_prefix, permissions, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(client_id)
    .bind(&key_hash)
    .bind(request.name.trim())
    .bind(&prefix)
    .bind(&request.permissions)
    .bind(request.expires_at)
    .fetch_one(pool)
    .await?;

    Ok(CreatedApiKeyResponse {
        api_key: raw_key,
        key_id,
        prefix,
        warning: "Save this API key now. You won't be able to see it again.".to_string(),
    })
}

/// Revoke a key (soft). Effective on the very next request that presents it.
pub async fn revoke(pool: &DbPool, client_id: Uuid, key_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1 AND client_id = $2")
        .bind(key_id)
        .bind(client_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(is_active: bool, expires_at: Option<DateTime<Utc>>) -> ApiKey {
        let raw = keys::generate_api_key(32);
        ApiKey {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            key_hash: keys::hash_api_key(&raw),
            name: "test key".to_string(),
            key_prefix: keys::key_prefix(&raw).to_string(),
            permissions: vec![],
            is_active,
            last_used_at: None,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn active_unexpired_key_is_allowed() {
        let key = record(true, None);
        assert!(validate(&key, Utc::now()).is_ok());
    }

    #[test]
    fn future_expiry_is_allowed() {
        let key = record(true, Some(Utc::now() + Duration::days(30)));
        assert!(validate(&key, Utc::now()).is_ok());
    }

    #[test]
    fn revoked_key_is_rejected_as_inactive() {
        let key = record(false, None);
        assert_eq!(validate(&key, Utc::now()), Err(ApiKeyRejection::Inactive));
    }

    #[test]
    fn expired_key_is_rejected_as_expired() {
        let key = record(true, Some(Utc::now() - Duration::seconds(1)));
        assert_eq!(validate(&key, Utc::now()), Err(ApiKeyRejection::Expired));
    }

    #[test]
    fn inactive_wins_over_expired() {
        // A key that is both revoked and expired reads as revoked in logs.
        let key = record(false, Some(Utc::now() - Duration::days(1)));
        assert_eq!(validate(&key, Utc::now()), Err(ApiKeyRejection::Inactive));
    }

    #[test]
    fn validation_uses_the_supplied_clock() {
        let expiry = Utc::now() + Duration::hours(1);
        let key = record(true, Some(expiry));
        assert!(validate(&key, expiry - Duration::seconds(1)).is_ok());
        assert_eq!(
            validate(&key, expiry + Duration::seconds(1)),
            Err(ApiKeyRejection::Expired)
        );
    }
}

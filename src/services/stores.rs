//! Store lifecycle: onboarding, token refresh, uninstall.
//!
//! A store comes into existence on the first successful OAuth completion or
//! the first session upsert for an unseen domain; re-installs refresh the
//! encrypted token and reactivate the row. Uninstall is a soft status
//! transition; rows are never deleted.

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::store::{Store, status};
use crate::security::{SecretCipher, keys};

/// Create or update the store for `shop_domain`, encrypting the access
/// token at rest.
///
/// New stores get freshly generated public/private credentials and a
/// webhook secret; existing stores keep theirs and only the token,
/// name, and lifecycle fields refresh. The write completes before the
/// caller responds; a timed-out request must not leave a half-installed
/// tenant.
pub async fn create_or_update(
    pool: &DbPool,
    cipher: &SecretCipher,
    shop_domain: &str,
    shop_name: &str,
    access_token: &str,
) -> Result<Store, AppError> {
    let encrypted_token = cipher.encrypt_to_hex(access_token)?;

    let api_key_public = keys::generate_api_key(keys::DEFAULT_KEY_BYTES);
    let api_key_private = keys::generate_api_key(keys::DEFAULT_KEY_BYTES);
    let webhook_secret = keys::generate_api_key(keys::DEFAULT_KEY_BYTES);

    let store = sqlx::query_as::<_, Store>(
        r#"
        INSERT INTO stores (
            shop_domain, shop_name, encrypted_access_token,
            api_key_public, api_key_private, webhook_secret, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (shop_domain) DO UPDATE SET
            shop_name = EXCLUDED.shop_name,
            encrypted_access_token = EXCLUDED.encrypted_access_token,
            status = EXCLUDED.status,
            uninstalled_at = NULL,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(shop_domain)
    .bind(shop_name)
    .bind(&encrypted_token)
    .bind(&api_key_public)
    .bind(&api_key_private)
    .bind(&webhook_secret)
    .bind(status::ACTIVE)
    .fetch_one(pool)
    .await?;

    Ok(store)
}

/// Fetch a store by its shop domain.
pub async fn find_by_domain(pool: &DbPool, shop_domain: &str) -> Result<Option<Store>, AppError> {
    let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE shop_domain = $1")
        .bind(shop_domain)
        .fetch_optional(pool)
        .await?;
    Ok(store)
}

/// Soft-retire a store on uninstall. The row and its history remain.
pub async fn mark_uninstalled(pool: &DbPool, shop_domain: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE stores
        SET status = $2, uninstalled_at = NOW(), updated_at = NOW()
        WHERE shop_domain = $1
        "#,
    )
    .bind(shop_domain)
    .bind(status::UNINSTALLED)
    .execute(pool)
    .await?;
    Ok(())
}

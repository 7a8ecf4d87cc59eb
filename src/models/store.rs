//! Tenant (store) model.
//!
//! One row per onboarded shop domain. Stores carry two opaque credentials:
//! a public storefront search key (safe to surface) and a private
//! administrative key (never serialized), plus a per-store webhook secret
//! and the encrypted third-party access token.
//!
//! Stores are never hard-deleted. Uninstalling flips `status` and stamps
//! `uninstalled_at`; a re-install reactivates the row and refreshes the
//! token.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle states for a store.
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const SUSPENDED: &str = "suspended";
    pub const UNINSTALLED: &str = "uninstalled";
}

/// Represents a store record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Store {
    pub id: Uuid,

    /// Unique external domain identifier, e.g. `acme.myshopify.com`
    pub shop_domain: String,

    pub shop_name: String,

    /// Hex-encoded AES-256-GCM blob; empty until the first token is stored
    pub encrypted_access_token: String,

    /// Public storefront search credential
    pub api_key_public: String,

    /// Private administrative credential; never leaves the server
    pub api_key_private: String,

    /// Shared secret for inbound webhook HMAC verification
    pub webhook_secret: String,

    pub plan_level: String,
    pub status: String,
    pub installed_at: DateTime<Utc>,
    pub uninstalled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store fields surfaced to authenticated dashboards.
///
/// Excludes the private key, webhook secret, and access token.
#[derive(Debug, Serialize)]
pub struct StorePublicView {
    pub id: Uuid,
    pub shop_domain: String,
    pub shop_name: String,
    pub api_key_public: String,
    pub plan_level: String,
    pub status: String,
    pub installed_at: DateTime<Utc>,
}

impl From<Store> for StorePublicView {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            shop_domain: store.shop_domain,
            shop_name: store.shop_name,
            api_key_public: store.api_key_public,
            plan_level: store.plan_level,
            status: store.status,
            installed_at: store.installed_at,
        }
    }
}

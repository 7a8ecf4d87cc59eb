//! API key model.
//!
//! The raw key exists only in the creation response. What persists is the
//! SHA-256 hash (for lookup), a short display prefix, and metadata. When a
//! request arrives with `Bearer <raw>` or `X-API-Key: <raw>`, we hash the
//! raw value and look up this record by hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an API key record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    pub id: Uuid,

    /// Owning client; every key belongs to exactly one
    pub client_id: Uuid,

    /// SHA-256 hash of the raw key (64 hex chars), unique system-wide
    pub key_hash: String,

    /// Human-readable label
    pub name: String,

    /// First characters of the raw key, for display identification
    pub key_prefix: String,

    pub permissions: Vec<String>,

    /// Revocation flag; inactive keys fail verification even on hash match
    pub is_active: bool,

    /// Best-effort usage timestamp, updated off the request path
    pub last_used_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    /// Optional expiry; an expired key fails verification even on hash match
    pub expires_at: Option<DateTime<Utc>>,
}

/// Key metadata returned on reads. Never includes the hash or raw key.
#[derive(Debug, Serialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub name: String,
    pub prefix: String,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            prefix: key.key_prefix,
            permissions: key.permissions,
            is_active: key.is_active,
            last_used_at: key.last_used_at,
            created_at: key.created_at,
            expires_at: key.expires_at,
        }
    }
}

/// Request body for `POST /api/v1/auth/clients/{client_id}/api-keys`.
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Creation response: the one and only appearance of the raw key.
#[derive(Debug, Serialize)]
pub struct CreatedApiKeyResponse {
    /// Full raw key, shown exactly once
    pub api_key: String,
    pub key_id: Uuid,
    pub prefix: String,
    pub warning: String,
}

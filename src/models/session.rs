//! Platform app session model.
//!
//! The embedded frontend stores its OAuth sessions through this backend.
//! Field names follow the frontend's camelCase convention on the wire;
//! the access token is encrypted before it reaches the `sessions` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a session record from the database.
///
/// `access_token` here is the hex-encoded ciphertext, not the raw token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub shop: String,
    pub state: String,
    pub is_online: bool,
    pub scope: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session payload as exchanged with the frontend.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub id: String,
    pub shop: String,
    pub state: String,
    #[serde(default)]
    pub is_online: bool,
    pub scope: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    pub access_token: String,
}

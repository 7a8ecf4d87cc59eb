//! Client organization model.
//!
//! Clients own API keys and are linked to users through the
//! `client_members` join table. Membership is always queried fresh; the
//! model never embeds a live user list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::api_key::ApiKeyResponse;

/// Represents a client record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,

    /// Globally unique organization name; doubles as the URL namespace
    /// segment for API-key-scoped routes
    pub name: String,

    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client fields returned to API clients.
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            description: client.description,
            is_active: client.is_active,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

/// Client detail view: the client plus its key metadata (prefixes only,
/// never hashes or raw keys).
#[derive(Debug, Serialize)]
pub struct ClientDetailResponse {
    #[serde(flatten)]
    pub client: ClientResponse,
    pub api_keys: Vec<ApiKeyResponse>,
}

/// Request body for `POST /api/v1/auth/clients`.
#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

//! Client organization and API key management endpoints.
//!
//! Every client-scoped operation re-checks the caller's membership against
//! the `client_members` table on that request. The decision is never
//! cached: removing a member locks them out of the very next request.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    access,
    db::DbPool,
    error::AppError,
    middleware::{api_key::ClientContext, user::UserContext},
    models::{
        api_key::{ApiKey, ApiKeyResponse, CreateApiKeyRequest, CreatedApiKeyResponse},
        client::{Client, ClientDetailResponse, ClientResponse, CreateClientRequest},
    },
    services::api_keys,
    state::AppState,
};

/// Current member user ids for a client, fetched fresh per request.
async fn member_user_ids(pool: &DbPool, client_id: Uuid) -> Result<Vec<Uuid>, AppError> {
    let ids = sqlx::query_scalar("SELECT user_id FROM client_members WHERE client_id = $1")
        .bind(client_id)
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Load a client by id (404 when absent) and enforce membership (403 when
/// the caller is not a current member).
async fn load_client_for_member(
    pool: &DbPool,
    client_id: Uuid,
    user_id: Uuid,
) -> Result<Client, AppError> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(client_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let members = member_user_ids(pool, client_id).await?;
    access::ensure_client_member(&members, user_id)?;

    Ok(client)
}

async fn client_keys(pool: &DbPool, client_id: Uuid) -> Result<Vec<ApiKeyResponse>, AppError> {
    let keys = sqlx::query_as::<_, ApiKey>(
        "SELECT * FROM api_keys WHERE client_id = $1 ORDER BY created_at DESC",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await?;
    Ok(keys.into_iter().map(Into::into).collect())
}

/// `POST /api/v1/auth/clients`
///
/// Creates a client with the caller as its first member. Client names are
/// globally unique (they double as URL namespaces), so a duplicate is 409.
pub async fn create_client(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), AppError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("client name is required".to_string()));
    }

    let existing: Option<Client> = sqlx::query_as("SELECT * FROM clients WHERE name = $1")
        .bind(&name)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("client name already exists".to_string()));
    }

    // Client row and founding membership commit together.
    let mut tx = state.pool.begin().await?;

    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (name, description)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(&name)
    .bind(request.description.trim())
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| AppError::conflict_on_unique(err, "client name already exists"))?;

    sqlx::query("INSERT INTO client_members (client_id, user_id) VALUES ($1, $2)")
        .bind(client.id)
        .bind(ctx.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(client.into())))
}

/// `GET /api/v1/auth/clients`: clients the caller belongs to.
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
) -> Result<Json<Vec<ClientResponse>>, AppError> {
    let clients = sqlx::query_as::<_, Client>(
        r#"
        SELECT c.*
        FROM clients c
        JOIN client_members m ON m.client_id = c.id
        WHERE m.user_id = $1
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(ctx.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

/// `GET /api/v1/auth/clients/{client_id}`: detail with key metadata.
pub async fn get_client(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<ClientDetailResponse>, AppError> {
    let client = load_client_for_member(&state.pool, client_id, ctx.user_id).await?;
    let api_keys = client_keys(&state.pool, client.id).await?;

    Ok(Json(ClientDetailResponse {
        client: client.into(),
        api_keys,
    }))
}

/// `POST /api/v1/auth/clients/{client_id}/api-keys`
///
/// Issues a key for the client. The response is the only place the raw key
/// appears; the insert completes before the response is sent.
pub async fn generate_api_key(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path(client_id): Path<Uuid>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<CreatedApiKeyResponse>), AppError> {
    load_client_for_member(&state.pool, client_id, ctx.user_id).await?;

    let created = api_keys::issue_for_client(&state.pool, client_id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `DELETE /api/v1/auth/clients/{client_id}/api-keys/{key_id}`
pub async fn revoke_api_key(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
    Path((client_id, key_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    load_client_for_member(&state.pool, client_id, ctx.user_id).await?;

    api_keys::revoke(&state.pool, client_id, key_id).await?;
    Ok(Json(json!({ "message": "API key revoked successfully" })))
}

/// `GET /api/v1/clients/{client_name}`
///
/// API-key authenticated client profile. The middleware has already
/// enforced that the presented key belongs to this namespace.
pub async fn get_client_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<ClientContext>,
) -> Result<Json<ClientDetailResponse>, AppError> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(ctx.client_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let api_keys = client_keys(&state.pool, client.id).await?;

    Ok(Json(ClientDetailResponse {
        client: client.into(),
        api_keys,
    }))
}

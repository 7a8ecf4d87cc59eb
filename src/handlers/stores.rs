//! Store dashboard endpoints, authenticated by store session token.

use axum::{Extension, Json, extract::State};

use crate::{
    error::AppError,
    middleware::store_session::StoreContext,
    models::store::{Store, StorePublicView},
    state::AppState,
};

/// `GET /api/v1/store`
///
/// The store bound to the presented session token, in its public view:
/// no private key, no webhook secret, no access token.
pub async fn get_current_store(
    State(state): State<AppState>,
    Extension(ctx): Extension<StoreContext>,
) -> Result<Json<StorePublicView>, AppError> {
    let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
        .bind(ctx.store_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(store.into()))
}

//! Store session authentication middleware.
//!
//! Verifies the bearer session token and injects the store identity into
//! the request. No database lookup: the signed claims are the proof.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{auth::session, error::AppError, state::AppState};

/// Identity attached to requests authenticated by a store session token.
#[derive(Debug, Clone)]
pub struct StoreContext {
    pub store_id: Uuid,
    pub shop: String,
}

pub async fn require_store_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token =
        super::bearer_token(request.headers()).ok_or(AppError::Unauthenticated)?;

    let claims = session::verify_session_token(token, state.signing_key())?;

    request.extensions_mut().insert(StoreContext {
        store_id: claims.store_id,
        shop: claims.shop,
    });

    Ok(next.run(request).await)
}

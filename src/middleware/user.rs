//! User token authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{auth::user, error::AppError, state::AppState};

/// Identity attached to requests authenticated by a user token.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: Uuid,
    pub email: String,
    pub client_id: Option<Uuid>,
}

pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token =
        super::bearer_token(request.headers()).ok_or(AppError::Unauthenticated)?;

    let claims = user::verify_user_token(token, state.signing_key())?;

    request.extensions_mut().insert(UserContext {
        user_id: claims.user_id,
        email: claims.email,
        client_id: claims.client_id,
    });

    Ok(next.run(request).await)
}

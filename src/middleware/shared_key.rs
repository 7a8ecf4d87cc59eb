//! Optional shared-key guard for the session storage endpoints.
//!
//! When `SESSION_API_KEY` is configured, those endpoints require it as a
//! bearer token; when unset (development), requests pass through. The
//! comparison is constant-time.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{error::AppError, state::AppState};

pub async fn optional_shared_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.session_api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = super::bearer_token(request.headers()).ok_or(AppError::Unauthenticated)?;

    let matches: bool = expected.as_bytes().ct_eq(provided.as_bytes()).into();
    if !matches {
        return Err(AppError::Unauthenticated);
    }

    Ok(next.run(request).await)
}

//! OAuth install handshake.
//!
//! `begin` hands the merchant's browser an authorize URL carrying a signed
//! state token; `callback` proves the redirect came back from the platform
//! (query HMAC) and from a handshake we started (state token), then
//! exchanges the code and onboards the store.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{self, session, state as state_tokens},
    error::AppError,
    models::store::StorePublicView,
    services::stores,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct BeginRequest {
    pub shop: String,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BeginResponse {
    pub auth_url: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub token: String,
    pub store: StorePublicView,
}

/// Lowercased, trimmed shop domain, or a validation error.
///
/// Good enough to keep obvious garbage out of URLs we construct; the HMAC
/// and state checks on the callback are the real authentication.
fn normalize_shop(shop: &str) -> Result<String, AppError> {
    let shop = shop.trim().to_lowercase();
    let valid = !shop.is_empty()
        && shop.contains('.')
        && shop
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !valid {
        return Err(AppError::Validation("invalid shop domain".to_string()));
    }
    Ok(shop)
}

/// `POST /api/v1/oauth/begin`
///
/// Issues a 15-minute state token bound to the shop and returns the
/// authorize URL to redirect the merchant to.
pub async fn begin(
    State(state): State<AppState>,
    Json(request): Json<BeginRequest>,
) -> Result<Json<BeginResponse>, AppError> {
    let shop = normalize_shop(&request.shop)?;

    let state_token =
        state_tokens::issue_state_token(&shop, state.signing_key(), auth::state_ttl())?;

    // The caller may pin its own redirect URI; used exactly as sent.
    let redirect_uri = request
        .redirect_uri
        .filter(|uri| !uri.is_empty())
        .unwrap_or_else(|| state.platform.default_redirect_uri());

    let auth_url = state
        .platform
        .build_install_url(&shop, &state_token, &redirect_uri)?;

    Ok(Json(BeginResponse {
        auth_url,
        state: state_token,
    }))
}

/// `GET /api/v1/oauth/callback`
///
/// # Verification order
///
/// 1. Query HMAC proves the redirect's parameters are the platform's
/// 2. State token proves we initiated a handshake for this exact shop
/// 3. Only then is the code exchanged for an access token
///
/// The access token is encrypted before it reaches the database. The store
/// upsert completes before the response; a 24h session token for the new
/// store is returned.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<CallbackResponse>, AppError> {
    if !state.platform.verify_callback_hmac(&params) {
        return Err(AppError::Unauthenticated);
    }

    let get = |name: &str| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    };

    let shop = get("shop").ok_or_else(missing_params)?;
    let code = get("code").ok_or_else(missing_params)?;
    let state_param = get("state").ok_or_else(missing_params)?;

    let claimed_shop = state_tokens::verify_state_token(state_param, state.signing_key())?;
    if claimed_shop != shop {
        tracing::warn!(%shop, %claimed_shop, "oauth state shop mismatch");
        return Err(AppError::Unauthenticated);
    }

    let access_token = state.platform.exchange_access_token(shop, code).await?;

    let store =
        stores::create_or_update(&state.pool, &state.cipher, shop, shop, &access_token).await?;

    let token = session::issue_session_token(
        store.id,
        &store.shop_domain,
        state.signing_key(),
        auth::session_ttl(),
    )?;

    Ok(Json(CallbackResponse {
        token,
        store: store.into(),
    }))
}

fn missing_params() -> AppError {
    AppError::Validation("missing required parameters".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shop_domains_are_normalized() {
        assert_eq!(
            normalize_shop("  Acme.Example.COM ").unwrap(),
            "acme.example.com"
        );
    }

    #[test]
    fn garbage_shop_domains_are_rejected() {
        for shop in ["", "no-dot", "https://acme.example.com", "a b.example.com"] {
            assert!(normalize_shop(shop).is_err(), "accepted {:?}", shop);
        }
    }
}

//! Inbound platform webhooks.
//!
//! The body is taken as raw bytes and the signature verified before any
//! parsing: the HMAC covers the exact bytes received, so re-serialized
//! JSON with the same meaning would not verify. Each store has its own
//! webhook secret; verification failure is terminal for the request.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
};
use serde_json::json;

use crate::{
    error::AppError,
    security::webhook,
    services::stores,
    state::AppState,
};

const SIGNATURE_HEADER: &str = "x-webhook-signature";
const SHOP_DOMAIN_HEADER: &str = "x-shop-domain";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).filter(|v| !v.is_empty())
}

/// `POST /api/v1/webhooks/{topic}/{subtopic}`
///
/// # Events
///
/// - `app/uninstalled`: soft-retires the store (status flip, row kept)
/// - anything else: acknowledged and ignored
pub async fn handle_webhook(
    State(state): State<AppState>,
    Path((topic, subtopic)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let signature = header(&headers, SIGNATURE_HEADER)
        .ok_or_else(|| AppError::Validation("missing required headers".to_string()))?;
    let shop_domain = header(&headers, SHOP_DOMAIN_HEADER)
        .ok_or_else(|| AppError::Validation("missing required headers".to_string()))?;

    let store = stores::find_by_domain(&state.pool, shop_domain)
        .await?
        .ok_or(AppError::NotFound)?;

    if !webhook::verify_webhook_signature(&store.webhook_secret, &body, signature) {
        tracing::warn!(shop = %shop_domain, "webhook signature verification failed");
        return Err(AppError::Unauthenticated);
    }

    let event = format!("{}/{}", topic, subtopic);
    match event.as_str() {
        "app/uninstalled" => {
            stores::mark_uninstalled(&state.pool, &store.shop_domain).await?;
            tracing::info!(shop = %store.shop_domain, "store uninstalled");
            Ok(Json(json!({ "status": "processed" })))
        }
        _ => Ok(Json(json!({ "message": "event ignored" }))),
    }
}

//! Multi-tenant search gateway - Main Application Entry Point
//!
//! This is a REST API gateway granting scoped access to a search backend on
//! behalf of independent stores and client organizations. The core of the
//! service is its credential handling: signed session/state tokens, hashed
//! API keys, encrypted third-party access tokens, and per-store webhook
//! signatures.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Tokens**: HS256-signed claims (jsonwebtoken)
//! - **API keys**: SHA-256 hash lookup, raw key shown once
//! - **Secrets at rest**: AES-256-GCM
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables (secrets are fatal if
//!    missing or malformed)
//! 2. Create database connection pool and run migrations
//! 3. Build the router: public routes plus three independently
//!    authenticated groups (user token, store session, API key)
//! 4. Serve

mod access;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod security;
mod services;
mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let server_port = config.server_port;
    let state = AppState::new(pool, config)?;

    // User-token protected routes (dashboard users and their clients)
    let user_routes = Router::new()
        .route("/api/v1/auth/me", get(handlers::user_auth::current_user))
        .route("/api/v1/auth/user", put(handlers::user_auth::update_user))
        .route("/api/v1/auth/clients", post(handlers::clients::create_client))
        .route("/api/v1/auth/clients", get(handlers::clients::list_clients))
        .route(
            "/api/v1/auth/clients/{client_id}",
            get(handlers::clients::get_client),
        )
        .route(
            "/api/v1/auth/clients/{client_id}/api-keys",
            post(handlers::clients::generate_api_key),
        )
        .route(
            "/api/v1/auth/clients/{client_id}/api-keys/{key_id}",
            delete(handlers::clients::revoke_api_key),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::user::require_user,
        ));

    // Store-session protected routes
    let store_routes = Router::new()
        .route("/api/v1/store", get(handlers::stores::get_current_store))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::store_session::require_store_session,
        ));

    // API-key protected routes; the middleware binds the key to the
    // {client_name} namespace
    let client_routes = Router::new()
        .route(
            "/api/v1/clients/{client_name}",
            get(handlers::clients::get_client_profile),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::api_key::require_api_key,
        ));

    // Session storage, optionally guarded by a shared key
    let session_routes = Router::new()
        .route("/api/v1/sessions", post(handlers::sessions::upsert_session))
        .route(
            "/api/v1/sessions/batch",
            delete(handlers::sessions::delete_sessions_batch),
        )
        .route(
            "/api/v1/sessions/shop/{shop}",
            get(handlers::sessions::get_sessions_by_shop),
        )
        .route("/api/v1/sessions/{id}", get(handlers::sessions::get_session))
        .route(
            "/api/v1/sessions/{id}",
            delete(handlers::sessions::delete_session),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::shared_key::optional_shared_key,
        ));

    let app = Router::new()
        // Public routes
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/auth/register", post(handlers::user_auth::register))
        .route("/api/v1/auth/login", post(handlers::user_auth::login))
        .route("/api/v1/oauth/begin", post(handlers::oauth::begin))
        .route("/api/v1/oauth/callback", get(handlers::oauth::callback))
        .route(
            "/api/v1/webhooks/{topic}/{subtopic}",
            post(handlers::webhooks::handle_webhook),
        )
        .merge(user_routes)
        .merge(store_routes)
        .merge(client_routes)
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

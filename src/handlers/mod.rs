//! HTTP request handlers.

/// Client organization and API key management
pub mod clients;
/// Health check
pub mod health;
/// OAuth install handshake
pub mod oauth;
/// Platform session storage
pub mod sessions;
/// Store dashboard endpoints
pub mod stores;
/// User registration and login
pub mod user_auth;
/// Inbound platform webhooks
pub mod webhooks;

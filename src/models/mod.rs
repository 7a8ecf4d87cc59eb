//! Data models representing database entities and their API views.

/// Client API key records
pub mod api_key;
/// Client organizations
pub mod client;
/// Platform app sessions
pub mod session;
/// Tenant (store) records
pub mod store;
/// Dashboard users
pub mod user;

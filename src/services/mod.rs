//! Business services sitting between handlers and the database.

/// API key issuance, validation, and usage tracking
pub mod api_keys;
/// Commerce platform OAuth client
pub mod platform;
/// Store lifecycle and encrypted token handling
pub mod stores;

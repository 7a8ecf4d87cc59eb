//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment
//! variables into a type-safe struct.
//!
//! The two process-wide secrets (JWT signing key, encryption key) are
//! required: their absence or malformation is a fatal startup error, never
//! a runtime-recoverable one. Both are loaded once and treated as immutable
//! for the life of the process.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 8080
/// - `JWT_SIGNING_KEY` (required): HMAC secret for session/state tokens
/// - `ENCRYPTION_KEY` (required): hex-encoded 32-byte AES-256-GCM key
/// - `ALLOW_LEGACY_PLAINTEXT_TOKENS` (optional): migration shim, default false
/// - `SESSION_API_KEY` (optional): shared bearer guarding session storage
/// - `PLATFORM_API_KEY` / `PLATFORM_API_SECRET` (required): OAuth app credentials
/// - `PLATFORM_APP_URL` (optional): base URL used for the OAuth redirect
/// - `PLATFORM_SCOPES` (optional): comma-separated OAuth scopes
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub jwt_signing_key: String,

    /// Hex-encoded 256-bit key for encrypting stored access tokens.
    pub encryption_key: String,

    /// One-time migration affordance: when set, stored token values that are
    /// not hex are passed through as legacy plaintext on read. Authenticated
    /// decryption failures still fail regardless of this flag. Remove once
    /// all rows are migrated.
    #[serde(default)]
    pub allow_legacy_plaintext_tokens: bool,

    /// Optional shared key for the session storage endpoints. When unset,
    /// those endpoints are open (development mode).
    #[serde(default)]
    pub session_api_key: Option<String>,

    pub platform_api_key: String,
    pub platform_api_secret: String,

    #[serde(default = "default_app_url")]
    pub platform_app_url: String,

    #[serde(default = "default_scopes")]
    pub platform_scopes: String,
}

fn default_port() -> u16 {
    8080
}

fn default_app_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_scopes() -> String {
    "read_products,write_products,read_product_listings,read_inventory,write_webhooks".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Attempts to load a `.env` file first (optional), then deserializes
    /// the environment. Field names are converted automatically:
    /// `jwt_signing_key` -> `JWT_SIGNING_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, if the signing
    /// key is empty, or if the encryption key does not decode to exactly
    /// 32 bytes. These are configuration errors and abort startup.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_signing_key.is_empty() {
            anyhow::bail!("JWT_SIGNING_KEY must not be empty");
        }
        self.encryption_key_bytes()?;
        Ok(())
    }

    /// Decode the hex encryption key into the fixed-length AES-256 key.
    pub fn encryption_key_bytes(&self) -> anyhow::Result<[u8; 32]> {
        let bytes = hex::decode(&self.encryption_key)
            .map_err(|_| anyhow::anyhow!("ENCRYPTION_KEY must be hex-encoded"))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("ENCRYPTION_KEY must decode to 32 bytes"))?;
        Ok(key)
    }

    /// The HMAC secret used to sign session, user, and OAuth state tokens.
    pub fn signing_key(&self) -> &[u8] {
        self.jwt_signing_key.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(encryption_key: &str, signing_key: &str) -> Config {
        Config {
            database_url: "postgres://localhost/storesearch".to_string(),
            server_port: 8080,
            jwt_signing_key: signing_key.to_string(),
            encryption_key: encryption_key.to_string(),
            allow_legacy_plaintext_tokens: false,
            session_api_key: None,
            platform_api_key: "app-key".to_string(),
            platform_api_secret: "app-secret".to_string(),
            platform_app_url: "http://localhost:8080".to_string(),
            platform_scopes: "read_products".to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_secrets() {
        let config = sample(&"ab".repeat(32), "signing-secret");
        assert!(config.validate().is_ok());
        assert_eq!(config.encryption_key_bytes().unwrap().len(), 32);
    }

    #[test]
    fn rejects_short_encryption_key() {
        let config = sample("abcdef", "signing-secret");
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_hex_encryption_key() {
        let config = sample(&"zz".repeat(32), "signing-secret");
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_signing_key() {
        let config = sample(&"ab".repeat(32), "");
        assert!(config.validate().is_err());
    }
}

//! Shared application state.
//!
//! Built once at startup and cloned into every handler and middleware via
//! Axum's `State` extraction. Everything in here is immutable after
//! construction: the secrets are read-only, the pool and HTTP client are
//! internally reference-counted.

use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;
use crate::security::SecretCipher;
use crate::services::platform::PlatformClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub cipher: SecretCipher,
    pub platform: PlatformClient,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> anyhow::Result<Self> {
        let cipher = SecretCipher::new(config.encryption_key_bytes()?);
        let platform = PlatformClient::new(&config)?;
        Ok(Self {
            pool,
            config: Arc::new(config),
            cipher,
            platform,
        })
    }

    /// The process-wide HMAC secret for signed tokens.
    pub fn signing_key(&self) -> &[u8] {
        self.config.signing_key()
    }
}

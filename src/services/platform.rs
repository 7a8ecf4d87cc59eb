//! Commerce platform OAuth client.
//!
//! The outbound half of the install handshake: building the authorize URL
//! and exchanging the callback code for an access token. Verification of
//! the callback itself lives in [`crate::security::webhook`].

use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::error::AppError;
use crate::security::webhook;

/// Timeout for the token exchange request.
const EXCHANGE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("token exchange request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange failed with status {0}")]
    ExchangeStatus(u16),
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        tracing::error!(error = %err, "platform oauth call failed");
        AppError::Internal
    }
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    #[allow(dead_code)]
    scope: Option<String>,
}

/// Client for the commerce platform's OAuth endpoints.
///
/// Cheap to clone; holds the app credentials and a pooled HTTP client.
#[derive(Clone)]
pub struct PlatformClient {
    api_key: String,
    api_secret: String,
    scopes: String,
    app_url: String,
    http: reqwest::Client,
}

impl PlatformClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(EXCHANGE_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key: config.platform_api_key.clone(),
            api_secret: config.platform_api_secret.clone(),
            scopes: config.platform_scopes.clone(),
            app_url: config.platform_app_url.clone(),
            http,
        })
    }

    /// Default redirect URI derived from the configured app URL.
    pub fn default_redirect_uri(&self) -> String {
        format!("{}/api/v1/oauth/callback", self.app_url.trim_end_matches('/'))
    }

    /// Build the authorize URL the merchant's browser is sent to.
    pub fn build_install_url(
        &self,
        shop: &str,
        state: &str,
        redirect_uri: &str,
    ) -> Result<String, AppError> {
        let mut url = Url::parse(&format!("https://{}/admin/oauth/authorize", shop))
            .map_err(|_| AppError::Validation("invalid shop domain".to_string()))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.api_key)
            .append_pair("scope", &self.scopes)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Exchange the OAuth callback code for an access token.
    pub async fn exchange_access_token(
        &self,
        shop: &str,
        code: &str,
    ) -> Result<String, PlatformError> {
        let endpoint = format!("https://{}/admin/oauth/access_token", shop);

        let response = self
            .http
            .post(&endpoint)
            .json(&serde_json::json!({
                "client_id": self.api_key,
                "client_secret": self.api_secret,
                "code": code,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PlatformError::ExchangeStatus(response.status().as_u16()));
        }

        let token: AccessTokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Verify the HMAC parameter on an OAuth callback, keyed by the app
    /// secret.
    pub fn verify_callback_hmac(&self, params: &[(String, String)]) -> bool {
        webhook::verify_callback_hmac(&self.api_secret, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PlatformClient {
        PlatformClient {
            api_key: "app-key".to_string(),
            api_secret: "app-secret".to_string(),
            scopes: "read_products".to_string(),
            app_url: "https://gateway.example.com/".to_string(),
            http: reqwest::Client::new(),
        }
    }

    #[test]
    fn install_url_carries_state_and_redirect() {
        let url = client()
            .build_install_url(
                "acme.example.com",
                "state-token",
                "https://gateway.example.com/api/v1/oauth/callback",
            )
            .unwrap();

        assert!(url.starts_with("https://acme.example.com/admin/oauth/authorize?"));
        assert!(url.contains("client_id=app-key"));
        assert!(url.contains("state=state-token"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fgateway.example.com"));
    }

    #[test]
    fn default_redirect_strips_trailing_slash() {
        assert_eq!(
            client().default_redirect_uri(),
            "https://gateway.example.com/api/v1/oauth/callback"
        );
    }
}

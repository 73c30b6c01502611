//! HTTP client for the xboxapi.com presence endpoint.

use crate::config::{MonitorConfig, Secret};
use crate::monitor::{FetchError, PresenceSource};
use crate::presence::RawPresence;

pub const DEFAULT_API_URL: &str = "https://xboxapi.com/v2";

const AUTH_HEADER: &str = "X-AUTH";

#[derive(Debug, Clone)]
pub struct XboxApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Secret,
}

impl XboxApiClient {
    pub fn new(api_key: Secret) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_URL)
    }

    pub fn with_base_url(api_key: Secret, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::with_base_url(config.xbox_api_key.clone(), config.xbox_api_url.as_str())
    }

    fn presence_url(&self, xuid: &str) -> String {
        format!("{}/{}/presence", self.base_url, xuid)
    }

    /// Fetches presence for `xuid`.
    ///
    /// Error payloads (`success: false`) decode to `Ok` even when the HTTP
    /// status is an error. Any other non-success status is a
    /// [`FetchError::Status`].
    ///
    /// # Errors
    /// Returns an error on transport failure, unexpected HTTP status, or an
    /// undecodable body.
    pub async fn presence(&self, xuid: &str) -> Result<RawPresence, FetchError> {
        let response = self
            .http
            .get(self.presence_url(xuid))
            .header(AUTH_HEADER, self.api_key.expose())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<RawPresence>(&body) {
            Ok(presence) if status.is_success() || !presence.success => Ok(presence),
            Ok(_) => Err(FetchError::Status(status)),
            Err(_) if !status.is_success() => Err(FetchError::Status(status)),
            Err(err) => Err(FetchError::Decode(err.to_string())),
        }
    }
}

impl PresenceSource for XboxApiClient {
    async fn fetch(&self, account_id: &str) -> Result<RawPresence, FetchError> {
        self.presence(account_id).await
    }
}

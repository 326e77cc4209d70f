//! Radio Garden content API client.
//!
//! Read-only JSON API: a places listing (every city in the directory,
//! with its country and coordinates) and a per-place channels page.
//! Requests run one at a time with a fixed timeout; there is no
//! authentication and no retry.

use serde::de::DeserializeOwned;

use super::error::GardenError;
use super::types::{ChannelsResponse, CityChannels, Place, PlacesResponse};

/// Default base URL for the content API.
const DEFAULT_BASE_URL: &str = "https://radio.garden/api/ara/content";

/// The places listing together with its version token.
#[derive(Debug)]
pub struct PlacesListing {
    /// Upstream data version; selects the stream cache namespace.
    pub version: String,
    pub places: Vec<Place>,
}

/// Configuration for the content API client.
#[derive(Debug, Clone)]
pub struct GardenConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GardenConfig {
    /// Create a config with the default production endpoint.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Directory of places and their station listings.
///
/// `GardenClient` is the production implementation; tests use the
/// in-memory [`MockDirectory`](super::mock::MockDirectory).
pub trait ContentDirectory {
    /// Fetch the full places listing and the upstream version token.
    fn places(&self) -> impl Future<Output = Result<PlacesListing, GardenError>> + Send;

    /// Fetch one city's channel listing.
    fn channels(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<CityChannels, GardenError>> + Send;

    /// Stream-page URL whose redirect points at the playable media.
    fn listen_url(&self, stream_id: &str) -> String;
}

/// HTTP client for the content API.
#[derive(Debug, Clone)]
pub struct GardenClient {
    http: reqwest::Client,
    base_url: String,
}

impl GardenClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GardenConfig) -> Result<Self, GardenError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// GET a JSON endpoint, mapping non-success statuses and decode
    /// failures to `GardenError`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GardenError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GardenError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| GardenError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl ContentDirectory for GardenClient {
    async fn places(&self) -> Result<PlacesListing, GardenError> {
        let url = format!("{}/places", self.base_url);
        let response: PlacesResponse = self.get_json(&url).await?;

        Ok(PlacesListing {
            version: response.version,
            places: response.data.list,
        })
    }

    async fn channels(&self, place_id: &str) -> Result<CityChannels, GardenError> {
        let url = format!("{}/page/{}/channels", self.base_url, place_id);
        let response: ChannelsResponse = self.get_json(&url).await?;

        Ok(response.data)
    }

    fn listen_url(&self, stream_id: &str) -> String {
        format!("{}/listen/{}/channel.mp3?r=1", self.base_url, stream_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = GardenConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_builder() {
        let config = GardenConfig::new()
            .with_base_url("http://localhost:8080")
            .with_timeout(5);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn client_creation() {
        assert!(GardenClient::new(GardenConfig::new()).is_ok());
    }

    #[test]
    fn listen_url_shape() {
        let client = GardenClient::new(GardenConfig::new()).unwrap();
        assert_eq!(
            client.listen_url("vbFsCngB"),
            "https://radio.garden/api/ara/content/listen/vbFsCngB/channel.mp3?r=1"
        );
    }
}

//! Mirelo HTTP client.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use sfx_models::VariationRequest;
use tracing::debug;

use crate::error::{MireloError, MireloResult};
use crate::types::SfxResponse;

/// Default synthesis endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.mirelo.ai/video-to-sfx";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Configuration for the Mirelo client.
#[derive(Debug, Clone)]
pub struct MireloConfig {
    /// Full URL of the `video-to-sfx` endpoint
    pub endpoint: String,
    /// API key sent in `x-api-key`
    pub api_key: String,
    /// Timeout for a single synthesis call
    pub timeout: Duration,
}

impl MireloConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the Mirelo synthesis service.
pub struct MireloClient {
    http: Client,
    config: MireloConfig,
}

impl MireloClient {
    /// Create a new Mirelo client.
    pub fn new(config: MireloConfig) -> MireloResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { http, config })
    }

    /// Request one sound effect and return the URL of the generated audio.
    ///
    /// Only 200 and 201 count as success. A success body without a usable
    /// URL yields [`MireloError::MissingOutput`].
    pub async fn generate(&self, request: &VariationRequest) -> MireloResult<String> {
        debug!(
            seed = request.seed,
            duration = request.duration,
            "Sending synthesis request to {}",
            self.config.endpoint
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(MireloError::Status(status.as_u16(), body));
        }

        let body: SfxResponse = response
            .json()
            .await
            .map_err(|e| MireloError::InvalidResponse(e.to_string()))?;

        body.audio_url()
            .map(str::to_string)
            .ok_or(MireloError::MissingOutput)
    }
}

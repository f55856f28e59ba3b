//! Source video download.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};

/// Anything that can produce the raw bytes of a video from its URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch(&self, url: &str) -> PipelineResult<Vec<u8>>;
}

/// Downloads videos over HTTP(S).
///
/// Certificate verification is disabled: sources are arbitrary caller
/// supplied hosts, often with self-signed or misconfigured certificates.
pub struct HttpVideoFetcher {
    http: Client,
}

impl HttpVideoFetcher {
    pub fn new(timeout: Duration) -> PipelineResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| PipelineError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl VideoSource for HttpVideoFetcher {
    async fn fetch(&self, url: &str) -> PipelineResult<Vec<u8>> {
        info!("Downloading video from: {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::fetch(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PipelineError::fetch(format!(
                "Failed to download video: {}",
                status.as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::fetch(e.to_string()))?;

        debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

//! Gemini client for multimodal plan generation.
//!
//! Sends the video inline alongside the text instruction and asks for a JSON
//! response. Only the raw response text is returned; decoding it is the
//! planner's job.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::planner::GenerativeModel;
use crate::settings::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

/// Header carrying the API key; keeps it out of request URLs and error text.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gemini API client.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct Blob {
    #[serde(rename = "mimeType")]
    mime_type: String,
    /// Base64-encoded payload
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::config(format!("Failed to build Gemini client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_json(
        &self,
        video: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> PipelineResult<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(Blob {
                            mime_type: mime_type.to_string(),
                            data: BASE64.encode(video),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(instruction.to_string()),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        info!(model = %self.config.model, video_bytes = video.len(), "Sending to Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                PipelineError::generation(format!("Gemini API request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::generation(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            PipelineError::generation(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| PipelineError::generation("No content in Gemini response"))?;

        debug!("Gemini response: {}", text);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-flash-latest:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            GeminiConfig::new("gemini-key")
                .with_base_url(server.uri())
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap()
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
        }))
    }

    #[tokio::test]
    async fn test_sends_inline_video_and_json_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "gemini-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [
                    {"inlineData": {"mimeType": "video/mp4", "data": "AQID"}},
                    {"text": "describe"}
                ]}],
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(text_response("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .generate_json(&[1, 2, 3], "video/mp4", "describe")
            .await
            .unwrap();
        assert_eq!(text, "[]");
    }

    #[tokio::test]
    async fn test_error_status_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_json(&[0], "video/mp4", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Generation(ref msg) if msg.contains("429") && msg.contains("quota")));
    }

    #[tokio::test]
    async fn test_timeout_error_does_not_expose_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(text_response("[]").set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = GeminiClient::new(
            GeminiConfig::new("SECRET-GEMINI-KEY")
                .with_base_url(server.uri())
                .with_timeout(Duration::from_millis(200)),
        )
        .unwrap();

        let err = client
            .generate_json(&[0], "video/mp4", "x")
            .await
            .unwrap_err();
        assert_eq!(err.category(), "generation");
        assert!(!err.to_string().contains("SECRET-GEMINI-KEY"));
        assert!(!err.to_string().contains("127.0.0.1"));
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate_json(&[0], "video/mp4", "x")
            .await
            .unwrap_err();
        assert_eq!(err.category(), "generation");
    }

    #[tokio::test]
    async fn test_endpoint_tolerates_trailing_slash() {
        let client = GeminiClient::new(
            GeminiConfig::new("k")
                .with_base_url("https://example.com/")
                .with_model("gemini-2.5-flash"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}

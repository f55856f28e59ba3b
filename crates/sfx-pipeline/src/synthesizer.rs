//! Variation synthesis.
//!
//! Every event gets [`VARIATIONS_PER_EVENT`] independent attempts with seeds
//! 55, 155, 255. Attempts never affect one another and never fail the
//! request; each one resolves to a [`VariationOutcome`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use sfx_mirelo::{MireloClient, MireloError};
use sfx_models::{EventDescriptor, VariationRequest, VARIATIONS_PER_EVENT};
use thiserror::Error;
use tracing::{info, warn};

use crate::metrics;

/// Why a single synthesis attempt produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out")]
    Timeout,

    #[error("provider returned {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("no audio URL in response")]
    MissingOutput,
}

impl AttemptFailure {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::Transport(_) => "transport",
            AttemptFailure::Timeout => "timeout",
            AttemptFailure::Status(_) => "status",
            AttemptFailure::InvalidResponse(_) => "invalid_response",
            AttemptFailure::MissingOutput => "missing_output",
        }
    }
}

impl From<MireloError> for AttemptFailure {
    fn from(err: MireloError) -> Self {
        match err {
            e if e.is_timeout() => AttemptFailure::Timeout,
            MireloError::Status(code, _) => AttemptFailure::Status(code),
            MireloError::Network(e) => AttemptFailure::Transport(e.to_string()),
            MireloError::InvalidResponse(msg) => AttemptFailure::InvalidResponse(msg),
            MireloError::MissingOutput => AttemptFailure::MissingOutput,
        }
    }
}

/// An SFX generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SfxSynthesizer: Send + Sync {
    /// Generate one sound and return its URL.
    async fn synthesize(&self, request: &VariationRequest) -> Result<String, AttemptFailure>;
}

#[async_trait]
impl SfxSynthesizer for MireloClient {
    async fn synthesize(&self, request: &VariationRequest) -> Result<String, AttemptFailure> {
        self.generate(request).await.map_err(AttemptFailure::from)
    }
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum VariationOutcome {
    Generated { seed: u32, url: String },
    Failed { seed: u32, reason: AttemptFailure },
}

impl VariationOutcome {
    pub fn seed(&self) -> u32 {
        match self {
            VariationOutcome::Generated { seed, .. } | VariationOutcome::Failed { seed, .. } => *seed,
        }
    }
}

/// Issues the seeded attempts for each event.
#[derive(Clone)]
pub struct VariationSynthesizer {
    backend: Arc<dyn SfxSynthesizer>,
    model_version: String,
}

impl VariationSynthesizer {
    pub fn new(backend: Arc<dyn SfxSynthesizer>, model_version: impl Into<String>) -> Self {
        Self {
            backend,
            model_version: model_version.into(),
        }
    }

    /// The requests for one event, in seed order.
    pub fn requests_for(&self, video_url: &str, event: &EventDescriptor) -> Vec<VariationRequest> {
        (0..VARIATIONS_PER_EVENT)
            .map(|attempt| VariationRequest::for_attempt(video_url, event, attempt, &self.model_version))
            .collect()
    }

    /// Run all attempts for one event concurrently.
    ///
    /// Outcomes are returned in seed order regardless of completion order.
    pub async fn synthesize_event(&self, video_url: &str, event: &EventDescriptor) -> Vec<VariationOutcome> {
        let requests = self.requests_for(video_url, event);

        let attempts = requests.iter().enumerate().map(|(index, request)| async move {
            let seed = request.seed;
            info!(event = %event.name, variation = index + 1, seed, "Sending to Mirelo");

            match self.backend.synthesize(request).await {
                Ok(url) => {
                    info!(event = %event.name, seed, "Got audio URL: {}", url);
                    metrics::record_synthesis_attempt("generated");
                    VariationOutcome::Generated { seed, url }
                }
                Err(reason) => {
                    warn!(event = %event.name, seed, "Synthesis attempt failed: {}", reason);
                    metrics::record_synthesis_attempt(reason.kind());
                    VariationOutcome::Failed { seed, reason }
                }
            }
        });

        join_all(attempts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use sfx_mirelo::MireloConfig;
    use sfx_models::EventType;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event() -> EventDescriptor {
        EventDescriptor::new("Rain", EventType::Loop, "soft rain")
            .with_start(1.5)
            .with_duration(4.0)
    }

    #[test]
    fn test_requests_in_seed_order() {
        let synth = VariationSynthesizer::new(Arc::new(MockSfxSynthesizer::new()), "latest");
        let requests = synth.requests_for("https://example.com/v.mp4", &event());

        let seeds: Vec<u32> = requests.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![55, 155, 255]);
        assert!(requests.iter().all(|r| r.start_offset == 1.5 && r.duration == 4.0));
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_other_attempts() {
        let mut backend = MockSfxSynthesizer::new();
        backend
            .expect_synthesize()
            .times(3)
            .returning(|req| match req.seed {
                55 => Err(AttemptFailure::Timeout),
                155 => Err(AttemptFailure::Status(502)),
                _ => Ok(format!("https://cdn.example.com/{}.wav", req.seed)),
            });

        let synth = VariationSynthesizer::new(Arc::new(backend), "latest");
        let outcomes = synth.synthesize_event("https://example.com/v.mp4", &event()).await;

        assert_eq!(
            outcomes,
            vec![
                VariationOutcome::Failed { seed: 55, reason: AttemptFailure::Timeout },
                VariationOutcome::Failed { seed: 155, reason: AttemptFailure::Status(502) },
                VariationOutcome::Generated {
                    seed: 255,
                    url: "https://cdn.example.com/255.wav".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_mirelo_error_mapping() {
        assert_eq!(
            AttemptFailure::from(MireloError::Status(404, "nope".into())),
            AttemptFailure::Status(404)
        );
        assert_eq!(AttemptFailure::from(MireloError::MissingOutput), AttemptFailure::MissingOutput);
        assert_eq!(AttemptFailure::MissingOutput.kind(), "missing_output");
    }

    #[test]
    fn test_outcome_seed() {
        let ok = VariationOutcome::Generated { seed: 55, url: "u".into() };
        let failed = VariationOutcome::Failed { seed: 155, reason: AttemptFailure::Timeout };
        assert_eq!(ok.seed(), 55);
        assert_eq!(failed.seed(), 155);
    }

    #[tokio::test]
    async fn test_slow_mirelo_attempt_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/video-to-sfx"))
            .and(body_partial_json(json!({"seed": 55})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"audio_url": "https://cdn.example.com/slow.wav"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/video-to-sfx"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"audio_url": "https://cdn.example.com/fast.wav"})),
            )
            .mount(&server)
            .await;

        let client = MireloClient::new(
            MireloConfig::new("mirelo-key")
                .with_endpoint(format!("{}/video-to-sfx", server.uri()))
                .with_timeout(Duration::from_millis(300)),
        )
        .unwrap();

        let synth = VariationSynthesizer::new(Arc::new(client), "latest");
        let outcomes = synth.synthesize_event("https://example.com/v.mp4", &event()).await;

        assert_eq!(
            outcomes[0],
            VariationOutcome::Failed { seed: 55, reason: AttemptFailure::Timeout }
        );
        assert_eq!(
            outcomes[1],
            VariationOutcome::Generated { seed: 155, url: "https://cdn.example.com/fast.wav".to_string() }
        );
    }
}

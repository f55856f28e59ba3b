//! Request orchestration.

use std::sync::Arc;
use std::time::Instant;

use sfx_mirelo::{MireloClient, MireloConfig};
use sfx_models::{ProcessingResult, VideoRequest};
use tracing::{info, info_span, warn, Instrument};

use crate::aggregator::aggregate;
use crate::error::{PipelineError, PipelineResult};
use crate::fetcher::{HttpVideoFetcher, VideoSource};
use crate::gemini::{GeminiClient, GeminiConfig};
use crate::metrics;
use crate::planner::{EventPlanner, GenerativeModel};
use crate::settings::PipelineSettings;
use crate::synthesizer::{SfxSynthesizer, VariationSynthesizer};

/// The full video-to-audio pipeline.
///
/// Holds only read-only collaborators; one instance serves any number of
/// concurrent requests.
#[derive(Clone)]
pub struct SfxPipeline {
    settings: PipelineSettings,
    source: Arc<dyn VideoSource>,
    planner: EventPlanner,
    synthesizer: VariationSynthesizer,
}

impl SfxPipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        settings: PipelineSettings,
        source: Arc<dyn VideoSource>,
        model: Arc<dyn GenerativeModel>,
        backend: Arc<dyn SfxSynthesizer>,
    ) -> Self {
        let synthesizer = VariationSynthesizer::new(backend, settings.mirelo_model_version.clone());
        Self {
            settings,
            source,
            planner: EventPlanner::new(model),
            synthesizer,
        }
    }

    /// Build the production pipeline: HTTP fetcher, Gemini and Mirelo.
    ///
    /// Missing credentials do not fail here; they fail each request instead.
    pub fn from_settings(settings: PipelineSettings) -> PipelineResult<Self> {
        let source = HttpVideoFetcher::new(settings.fetch_timeout)?;

        let gemini = GeminiClient::new(
            GeminiConfig::new(settings.gemini_api_key.clone().unwrap_or_default())
                .with_model(settings.gemini_model.clone())
                .with_base_url(settings.gemini_base_url.clone())
                .with_timeout(settings.generation_timeout),
        )?;

        let mirelo = MireloClient::new(
            MireloConfig::new(settings.mirelo_api_key.clone().unwrap_or_default())
                .with_endpoint(settings.mirelo_endpoint.clone())
                .with_timeout(settings.synthesis_timeout),
        )
        .map_err(|e| PipelineError::config(format!("Failed to build Mirelo client: {}", e)))?;

        Ok(Self::new(
            settings,
            Arc::new(source),
            Arc::new(gemini),
            Arc::new(mirelo),
        ))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process one request end to end.
    pub async fn process(&self, request: &VideoRequest) -> PipelineResult<ProcessingResult> {
        let span = info_span!("process", video_url = %request.video_url);
        let start = Instant::now();
        let result = self.run(request).instrument(span).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.category(),
        };
        metrics::record_request(outcome, start.elapsed().as_secs_f64());

        result
    }

    async fn run(&self, request: &VideoRequest) -> PipelineResult<ProcessingResult> {
        self.settings.credentials()?;

        info!("User prompt: {}", request.user_prompt);

        let stage = Instant::now();
        let video = self.source.fetch(&request.video_url).await?;
        metrics::record_stage_duration("download", stage.elapsed().as_secs_f64());
        info!("Downloaded {} bytes", video.len());

        let stage = Instant::now();
        let plan = self.planner.plan(&video, &request.user_prompt).await?;
        metrics::record_stage_duration("plan", stage.elapsed().as_secs_f64());
        metrics::record_events_planned(plan.len());
        drop(video);

        let stage = Instant::now();
        let mut results = Vec::with_capacity(plan.len());
        for event in plan {
            info!("Processing event: {}", event.name);
            let outcomes = self
                .synthesizer
                .synthesize_event(&request.video_url, &event)
                .await;

            let name = event.name.clone();
            match aggregate(event, outcomes) {
                Some(result) => results.push(result),
                None => {
                    warn!(event = %name, "No variations generated, dropping event");
                    metrics::record_event_dropped();
                }
            }
        }
        metrics::record_stage_duration("synthesis", stage.elapsed().as_secs_f64());

        info!("Returning {} events", results.len());
        Ok(ProcessingResult::success(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;
    use sfx_models::EventType;

    use crate::fetcher::MockVideoSource;
    use crate::planner::MockGenerativeModel;
    use crate::synthesizer::{AttemptFailure, MockSfxSynthesizer};

    const VIDEO_URL: &str = "https://example.com/v.mp4";
    const WIND_PLAN: &str = r#"[{"name":"Wind","type":"LOOP","start":0.0,"duration":5.0,"audio_prompt":"howling wind"}]"#;

    fn settings() -> PipelineSettings {
        PipelineSettings::default().with_credentials("gemini-key", "mirelo-key")
    }

    fn request() -> VideoRequest {
        VideoRequest::new(VIDEO_URL, "make it stormy")
    }

    fn source_ok() -> MockVideoSource {
        let mut source = MockVideoSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(vec![0u8, 1, 2, 3]));
        source
    }

    fn model_returning(text: &'static str) -> MockGenerativeModel {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_json()
            .times(1)
            .returning(move |_, _, _| Ok(text.to_string()));
        model
    }

    fn never_synthesize() -> MockSfxSynthesizer {
        let mut backend = MockSfxSynthesizer::new();
        backend.expect_synthesize().times(0);
        backend
    }

    fn url_for(seed: u32) -> String {
        format!("https://cdn.mirelo.ai/{}.wav", seed)
    }

    fn pipeline(
        settings: PipelineSettings,
        source: MockVideoSource,
        model: MockGenerativeModel,
        backend: MockSfxSynthesizer,
    ) -> SfxPipeline {
        SfxPipeline::new(settings, Arc::new(source), Arc::new(model), Arc::new(backend))
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_any_call() {
        let mut source = MockVideoSource::new();
        source.expect_fetch().times(0);
        let mut model = MockGenerativeModel::new();
        model.expect_generate_json().times(0);

        let settings = PipelineSettings {
            mirelo_api_key: None,
            ..settings()
        };
        let err = pipeline(settings, source, model, never_synthesize())
            .process(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_request() {
        let mut source = MockVideoSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Err(PipelineError::fetch("Failed to download video: 404")));
        let mut model = MockGenerativeModel::new();
        model.expect_generate_json().times(0);

        let err = pipeline(settings(), source, model, never_synthesize())
            .process(&request())
            .await
            .unwrap_err();

        assert_eq!(err.category(), "download");
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_unparseable_plan_aborts_request() {
        let err = pipeline(
            settings(),
            source_ok(),
            model_returning("I could not analyze this video."),
            never_synthesize(),
        )
        .process(&request())
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::Generation(_)));
    }

    #[tokio::test]
    async fn test_non_array_plan_aborts_request() {
        let err = pipeline(
            settings(),
            source_ok(),
            model_returning(r#"{"name":"Wind","type":"LOOP","audio_prompt":"wind"}"#),
            never_synthesize(),
        )
        .process(&request())
        .await
        .unwrap_err();

        assert_eq!(err.category(), "generation");
    }

    #[tokio::test]
    async fn test_model_error_aborts_request() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_json()
            .times(1)
            .returning(|_, _, _| Err(PipelineError::generation("Gemini API request failed: timeout")));

        let err = pipeline(settings(), source_ok(), model, never_synthesize())
            .process(&request())
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Gemini Error:"));
    }

    #[tokio::test]
    async fn test_stormy_scenario_with_one_failed_attempt() {
        let mut backend = MockSfxSynthesizer::new();
        backend
            .expect_synthesize()
            .times(3)
            .returning(|req| match req.seed {
                155 => Err(AttemptFailure::Status(500)),
                seed => Ok(url_for(seed)),
            });

        let result = pipeline(settings(), source_ok(), model_returning(WIND_PLAN), backend)
            .process(&request())
            .await
            .unwrap();

        assert_eq!(result.data.len(), 1);
        let wind = &result.data[0];
        assert_eq!(wind.name, "Wind");
        assert_eq!(wind.event_type, EventType::Loop);
        assert_eq!(wind.variations, vec![url_for(55), url_for(255)]);

        let original: serde_json::Value = serde_json::from_str::<serde_json::Value>(WIND_PLAN).unwrap()[0].clone();
        assert_eq!(serde_json::to_value(&wind.metadata).unwrap(), original);
    }

    #[tokio::test]
    async fn test_all_attempts_failing_still_succeeds() {
        let mut backend = MockSfxSynthesizer::new();
        backend
            .expect_synthesize()
            .times(3)
            .returning(|_| Err(AttemptFailure::Transport("connection reset".into())));

        let result = pipeline(settings(), source_ok(), model_returning(WIND_PLAN), backend)
            .process(&request())
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"status": "success", "data": []})
        );
    }

    #[tokio::test]
    async fn test_two_of_three_failures_keep_event() {
        let mut backend = MockSfxSynthesizer::new();
        backend
            .expect_synthesize()
            .times(3)
            .returning(|req| match req.seed {
                255 => Ok(url_for(255)),
                _ => Err(AttemptFailure::MissingOutput),
            });

        let result = pipeline(settings(), source_ok(), model_returning(WIND_PLAN), backend)
            .process(&request())
            .await
            .unwrap();

        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].variations, vec![url_for(255)]);
    }

    #[tokio::test]
    async fn test_defaults_and_duration_floor_reach_synthesizer() {
        const PLAN: &str = r#"[
            {"name":"Tick","type":"EMITTER","duration":0.2,"audio_prompt":"clock tick"},
            {"name":"Hum","type":"LOOP","audio_prompt":"electrical hum"}
        ]"#;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let mut backend = MockSfxSynthesizer::new();
        backend.expect_synthesize().times(6).returning(move |req| {
            recorder
                .lock()
                .unwrap()
                .push((req.text_prompt.clone(), req.start_offset, req.duration, req.seed));
            Ok(url_for(req.seed))
        });

        pipeline(settings(), source_ok(), model_returning(PLAN), backend)
            .process(&request())
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        let tick: Vec<_> = seen.iter().filter(|r| r.0 == "clock tick").collect();
        let hum: Vec<_> = seen.iter().filter(|r| r.0 == "electrical hum").collect();

        assert!(tick.iter().all(|r| r.1 == 0.0 && r.2 == 1.0));
        assert!(hum.iter().all(|r| r.1 == 0.0 && r.2 == 2.0));
        assert_eq!(tick.iter().map(|r| r.3).collect::<Vec<_>>(), vec![55, 155, 255]);
        assert_eq!(hum.iter().map(|r| r.3).collect::<Vec<_>>(), vec![55, 155, 255]);
    }

    #[tokio::test]
    async fn test_event_order_preserved_and_empty_events_dropped() {
        const PLAN: &str = r#"[
            {"name":"A","type":"LOOP","audio_prompt":"a"},
            {"name":"B","type":"EMITTER","audio_prompt":"b"},
            {"name":"C","type":"EMITTER","audio_prompt":"c"}
        ]"#;

        let mut backend = MockSfxSynthesizer::new();
        backend.expect_synthesize().times(9).returning(|req| {
            if req.text_prompt == "b" {
                Err(AttemptFailure::Timeout)
            } else {
                Ok(format!("https://cdn.mirelo.ai/{}-{}.wav", req.text_prompt, req.seed))
            }
        });

        let result = pipeline(settings(), source_ok(), model_returning(PLAN), backend)
            .process(&request())
            .await
            .unwrap();

        let names: Vec<&str> = result.data.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert!(result.data.iter().all(|e| e.variations.len() == 3));
    }

    #[tokio::test]
    async fn test_empty_plan() {
        let result = pipeline(settings(), source_ok(), model_returning("[]"), never_synthesize())
            .process(&request())
            .await
            .unwrap();
        assert!(result.data.is_empty());
    }
}

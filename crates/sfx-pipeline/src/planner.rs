//! Audio event planning.
//!
//! Builds the instruction for the multimodal model, sends it with the video,
//! and decodes the answer into typed [`EventDescriptor`]s. Any failure here is
//! fatal to the request: a partial plan is never used.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sfx_models::EventDescriptor;
use tracing::info;

use crate::error::{PipelineError, PipelineResult};

/// MIME type attached to the inline video.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// A generative model that accepts a video plus instruction and answers in JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Returns the raw response text, which should be JSON.
    async fn generate_json(
        &self,
        video: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> PipelineResult<String>;
}

/// Turns a video and a user prompt into a list of audio events.
#[derive(Clone)]
pub struct EventPlanner {
    model: Arc<dyn GenerativeModel>,
}

impl EventPlanner {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub async fn plan(&self, video: &[u8], user_prompt: &str) -> PipelineResult<Vec<EventDescriptor>> {
        let instruction = build_instruction(user_prompt);
        let text = self
            .model
            .generate_json(video, VIDEO_MIME_TYPE, &instruction)
            .await?;

        let plan = parse_plan(&text)?;
        info!("Parsed {} events", plan.len());
        Ok(plan)
    }
}

/// Build the planning instruction around the user's request.
pub fn build_instruction(user_prompt: &str) -> String {
    format!(
        r#"You are an Environment Audio Lead.
User Request: "{user_prompt}"

Analyze the video and the user request to design a procedural audio system.
Identify distinct environmental audio events (LOOPS for background, EMITTERS for specific details).

For each event, provide:
1. 'name': Short ID.
2. 'type': "LOOP" or "EMITTER".
3. 'start': Best timestamp to sample this texture (start offset, seconds).
4. 'duration': LOOPS : min=1s max=10s, EMITTERS : min=1s max=10s.
5. 'audio_prompt': A highly descriptive prompt for an SFX generator.

Return a JSON list of objects:
[{{ "name": "Wind", "type": "LOOP", "start": 0.0, "duration": 10.0, "audio_prompt": "Cold wind..." }}]
"#
    )
}

/// Decode the model's answer into event descriptors.
///
/// Accepts a bare JSON array, optionally wrapped in a markdown code fence.
/// Every element must decode; one bad element rejects the whole plan.
pub fn parse_plan(text: &str) -> PipelineResult<Vec<EventDescriptor>> {
    let body = strip_code_fence(text);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| PipelineError::generation(format!("Failed to parse plan JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(PipelineError::generation(format!(
                "Expected a JSON array of events, got {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| {
                PipelineError::generation(format!("Invalid event at index {}: {}", index, e))
            })
        })
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

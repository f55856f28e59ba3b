//! Synthesis requests for individual variations.

use serde::{Deserialize, Serialize};

use crate::event::EventDescriptor;

/// Number of independent variations requested per event.
pub const VARIATIONS_PER_EVENT: u32 = 3;

/// Seed for the given 0-indexed attempt: 55, 155, 255, ...
pub fn variation_seed(attempt: u32) -> u32 {
    attempt * 100 + 55
}

/// Body of one request to the SFX synthesis provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationRequest {
    pub video_url: String,
    /// Seconds into the source video
    pub start_offset: f64,
    /// Seconds, at least 1.0
    pub duration: f64,
    pub text_prompt: String,
    pub model_version: String,
    pub seed: u32,
}

impl VariationRequest {
    /// Build the request for one attempt at an event.
    pub fn for_attempt(
        video_url: &str,
        event: &EventDescriptor,
        attempt: u32,
        model_version: &str,
    ) -> Self {
        Self {
            video_url: video_url.to_string(),
            start_offset: event.start_offset(),
            duration: event.synthesis_duration(),
            text_prompt: event.audio_prompt.clone(),
            model_version: model_version.to_string(),
            seed: variation_seed(attempt),
        }
    }
}

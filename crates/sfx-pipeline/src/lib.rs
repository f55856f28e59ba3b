//! Video-to-ambient-audio pipeline.
//!
//! A request flows through four stages:
//! 1. [`fetcher`]: download the source video
//! 2. [`planner`]: ask a multimodal model for a plan of audio events
//! 3. [`synthesizer`]: request three seeded variations per event
//! 4. [`aggregator`]: keep events that produced at least one variation
//!
//! Download and planning failures abort the request. Synthesis failures are
//! absorbed per attempt.

pub mod aggregator;
pub mod error;
pub mod fetcher;
pub mod gemini;
pub mod metrics;
pub mod pipeline;
pub mod planner;
pub mod settings;
pub mod synthesizer;

pub use aggregator::aggregate;
pub use error::{PipelineError, PipelineResult};
pub use fetcher::{HttpVideoFetcher, VideoSource};
pub use gemini::{GeminiClient, GeminiConfig};
pub use pipeline::SfxPipeline;
pub use planner::{EventPlanner, GenerativeModel};
pub use settings::PipelineSettings;
pub use synthesizer::{AttemptFailure, SfxSynthesizer, VariationOutcome, VariationSynthesizer};

//! Shared data models for the SoundStage backend.
//!
//! This crate provides Serde-serializable types for:
//! - Incoming video processing requests
//! - Audio event descriptors produced by the planner
//! - Synthesis requests sent to the SFX provider
//! - Per-event results and the final response payload

pub mod event;
pub mod request;
pub mod result;
pub mod variation;

// Re-export common types
pub use event::{EventDescriptor, EventType, UnknownEventType, DEFAULT_DURATION_SECS, MIN_DURATION_SECS};
pub use request::VideoRequest;
pub use result::{EventResult, ProcessingResult, ProcessingStatus};
pub use variation::{variation_seed, VariationRequest, VARIATIONS_PER_EVENT};

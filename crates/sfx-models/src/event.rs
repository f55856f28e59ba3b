//! Audio event descriptors.
//!
//! The planner asks the generative model for a JSON array of events. Each
//! element decodes into an [`EventDescriptor`], which keeps the object exactly
//! as the model wrote it so it can be echoed back to the caller unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Duration used when the planner omits one (seconds).
pub const DEFAULT_DURATION_SECS: f64 = 2.0;

/// Shortest duration ever sent to the synthesis provider (seconds).
pub const MIN_DURATION_SECS: f64 = 1.0;

/// Kind of environmental sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Continuous background texture.
    Loop,
    /// Discrete, localized detail sound.
    Emitter,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type '{0}', expected LOOP or EMITTER")]
pub struct UnknownEventType(pub String);

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Loop => "LOOP",
            EventType::Emitter => "EMITTER",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOOP" => Ok(EventType::Loop),
            "EMITTER" => Ok(EventType::Emitter),
            _ => Err(UnknownEventType(s.to_string())),
        }
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Typed view of the fields the pipeline reads.
#[derive(Deserialize)]
struct KnownFields {
    name: String,
    #[serde(rename = "type")]
    event_type: EventType,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
    audio_prompt: String,
}

/// One planned audio event.
///
/// Serializes as the original JSON object, not as the typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDescriptor {
    /// Short identifier (e.g. "Wind")
    pub name: String,

    pub event_type: EventType,

    /// Offset into the source video to sample from (seconds)
    pub start: Option<f64>,

    /// Requested clip length (seconds)
    pub duration: Option<f64>,

    /// Prompt for the SFX generator
    pub audio_prompt: String,

    /// The object exactly as received
    raw: Map<String, Value>,
}

impl Serialize for EventDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EventDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let fields: KnownFields = serde_json::from_value(Value::Object(raw.clone()))
            .map_err(serde::de::Error::custom)?;

        Ok(Self {
            name: fields.name,
            event_type: fields.event_type,
            start: fields.start,
            duration: fields.duration,
            audio_prompt: fields.audio_prompt,
            raw,
        })
    }
}

impl EventDescriptor {
    pub fn new(name: impl Into<String>, event_type: EventType, audio_prompt: impl Into<String>) -> Self {
        let name = name.into();
        let audio_prompt = audio_prompt.into();

        let mut raw = Map::new();
        raw.insert("name".to_string(), Value::from(name.as_str()));
        raw.insert("type".to_string(), Value::from(event_type.as_str()));
        raw.insert("audio_prompt".to_string(), Value::from(audio_prompt.as_str()));

        Self {
            name,
            event_type,
            start: None,
            duration: None,
            audio_prompt,
            raw,
        }
    }

    pub fn with_start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self.raw.insert("start".to_string(), Value::from(start));
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self.raw.insert("duration".to_string(), Value::from(duration));
        self
    }

    /// Start offset to sample from, defaulting to the beginning of the video.
    pub fn start_offset(&self) -> f64 {
        self.start.unwrap_or(0.0)
    }

    /// Duration to request from the synthesizer.
    ///
    /// Falls back to [`DEFAULT_DURATION_SECS`] and never goes below
    /// [`MIN_DURATION_SECS`]. No upper bound is applied.
    pub fn synthesis_duration(&self) -> f64 {
        self.duration
            .unwrap_or(DEFAULT_DURATION_SECS)
            .max(MIN_DURATION_SECS)
    }
}

//! Response payload types.

use serde::{Deserialize, Serialize};

use crate::event::{EventDescriptor, EventType};

/// Generated variations for one planned event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResult {
    pub name: String,

    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Audio URLs in attempt order. Never empty.
    pub variations: Vec<String>,

    /// The descriptor exactly as planned
    pub metadata: EventDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Success,
}

/// Final response for one processing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub status: ProcessingStatus,
    pub data: Vec<EventResult>,
}

impl ProcessingResult {
    pub fn success(data: Vec<EventResult>) -> Self {
        Self {
            status: ProcessingStatus::Success,
            data,
        }
    }
}

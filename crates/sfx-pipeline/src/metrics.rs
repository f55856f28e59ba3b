//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; nothing is emitted unless the host
//! process installs a recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const PIPELINE_REQUESTS_TOTAL: &str = "sfx_pipeline_requests_total";
    pub const PIPELINE_DURATION_SECONDS: &str = "sfx_pipeline_duration_seconds";
    pub const STAGE_DURATION_SECONDS: &str = "sfx_stage_duration_seconds";
    pub const EVENTS_PLANNED_TOTAL: &str = "sfx_events_planned_total";
    pub const EVENTS_DROPPED_TOTAL: &str = "sfx_events_dropped_total";
    pub const SYNTHESIS_ATTEMPTS_TOTAL: &str = "sfx_synthesis_attempts_total";
}

/// Record a finished pipeline request. `outcome` is `success` or an error category.
pub fn record_request(outcome: &str, duration_secs: f64) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::PIPELINE_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::PIPELINE_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record how long one stage (`download`, `plan`, `synthesis`) took.
pub fn record_stage_duration(stage: &str, duration_secs: f64) {
    let labels = [("stage", stage.to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_events_planned(count: usize) {
    counter!(names::EVENTS_PLANNED_TOTAL).increment(count as u64);
}

pub fn record_event_dropped() {
    counter!(names::EVENTS_DROPPED_TOTAL).increment(1);
}

/// Record one synthesis attempt. `outcome` is `generated` or a failure kind.
pub fn record_synthesis_attempt(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::SYNTHESIS_ATTEMPTS_TOTAL, &labels).increment(1);
}

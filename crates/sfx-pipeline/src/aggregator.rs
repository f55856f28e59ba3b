//! Per-event result assembly.

use sfx_models::{EventDescriptor, EventResult};

use crate::synthesizer::VariationOutcome;

/// Combine an event with its attempt outcomes.
///
/// Returns `None` when no attempt produced audio; such events are left out of
/// the response. Generated URLs keep seed order.
pub fn aggregate(event: EventDescriptor, mut outcomes: Vec<VariationOutcome>) -> Option<EventResult> {
    outcomes.sort_by_key(VariationOutcome::seed);

    let variations: Vec<String> = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            VariationOutcome::Generated { url, .. } => Some(url),
            VariationOutcome::Failed { .. } => None,
        })
        .collect();

    if variations.is_empty() {
        return None;
    }

    Some(EventResult {
        name: event.name.clone(),
        event_type: event.event_type,
        variations,
        metadata: event,
    })
}

//! Novelty filter: which freshly parsed events have not been announced yet.

use std::collections::HashSet;

use crate::models::Event;

/// Events whose identity key is not in `seen`, in their original order.
pub fn diff(all_events: &[Event], seen: &HashSet<String>) -> Vec<Event> {
    all_events
        .iter()
        .filter(|event| !seen.contains(&event.identity_key))
        .cloned()
        .collect()
}

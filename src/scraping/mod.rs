pub mod base;
pub mod cards_html;
pub mod months;
pub mod table_html;

use std::collections::HashSet;

use log::{debug, info};
use scraper::Html;

use crate::assemble::{self, AssemblyContext};
use crate::models::{Event, RawCandidate};

/// One markup shape the afisha page has been published in.
pub trait LayoutExtractor: Send + Sync {
    fn layout_id(&self) -> &'static str;
    /// Candidates found in `document`; empty when the layout is absent.
    fn extract(&self, document: &Html) -> Vec<RawCandidate>;
}

fn active_layouts() -> Vec<Box<dyn LayoutExtractor>> {
    vec![
        Box::new(cards_html::CardLayout),
        Box::new(table_html::TableLayout),
    ]
}

pub fn list_layouts() -> Vec<&'static str> {
    active_layouts()
        .iter()
        .map(|layout| layout.layout_id())
        .collect()
}

/// Runs the layouts in order and keeps the candidates of the first one that matches.
pub fn extract_candidates(document: &Html) -> Vec<RawCandidate> {
    for layout in active_layouts() {
        let candidates = layout.extract(document);
        if candidates.is_empty() {
            debug!("layout {} absent", layout.layout_id());
            continue;
        }
        info!(
            "layout {} matched {} candidates",
            layout.layout_id(),
            candidates.len()
        );
        return candidates;
    }
    Vec::new()
}

/// Parses the afisha page into canonical events, in page order, without duplicates.
pub fn parse_page(html: &str, context: &AssemblyContext) -> Vec<Event> {
    let document = Html::parse_document(html);
    let mut keys = HashSet::new();
    let mut events = Vec::new();

    for candidate in extract_candidates(&document) {
        let Some(event) = assemble::assemble(&candidate, context) else {
            debug!("rejected candidate {candidate:?}");
            continue;
        };
        if keys.insert(event.identity_key.clone()) {
            events.push(event);
        }
    }

    events
}

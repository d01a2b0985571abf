use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::base;
use super::LayoutExtractor;
use crate::models::{MonthHint, RawCandidate};

const LAYOUT_ID: &str = "cards";

static CARD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[class*="item_mounth"] .afisha-item"#).expect("cards card selector")
});
static DAY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".afisha-item__day").expect("cards day"));
static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".afisha-item__time").expect("cards time"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".afisha-item__title").expect("cards title"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.afisha-item__link[href]").expect("cards link"));
// the site spells the bucket marker "mounth"; it may sit inside a longer class name
static BUCKET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"item_mounth-([0-9]{4})-([0-9]{2})(?:[^0-9]|$)").expect("cards bucket regex")
});

/// Current layout: cards grouped into `item_mounth-YYYY-MM` month buckets.
pub struct CardLayout;

impl LayoutExtractor for CardLayout {
    fn layout_id(&self) -> &'static str {
        LAYOUT_ID
    }

    fn extract(&self, document: &Html) -> Vec<RawCandidate> {
        let mut candidates = Vec::new();

        for card in document.select(&CARD_SELECTOR) {
            let day_text = match base::first_text(&card, &DAY_SELECTOR) {
                Some(text) => text,
                None => continue,
            };
            let time_text = match base::first_text(&card, &TIME_SELECTOR) {
                Some(text) => text,
                None => continue,
            };
            let title_text = match base::first_text(&card, &TITLE_SELECTOR) {
                Some(text) => text,
                None => continue,
            };
            let href = match base::first_attr(&card, &LINK_SELECTOR, "href") {
                Some(href) => href,
                None => continue,
            };

            candidates.push(RawCandidate {
                day_text,
                time_text,
                title_text,
                href,
                hint: bucket_hint(&card),
            });
        }

        candidates
    }
}

/// Year and month of the nearest enclosing month bucket, if it carries one.
fn bucket_hint(card: &ElementRef<'_>) -> Option<MonthHint> {
    let bucket = base::nearest_ancestor(card, base::parent_element, |el| {
        el.value()
            .attr("class")
            .map(|class| BUCKET_RE.is_match(class))
            .unwrap_or(false)
    })?;
    let class = bucket.value().attr("class")?;
    let caps = BUCKET_RE.captures(class)?;
    Some(MonthHint {
        year: caps[1].to_string(),
        month: caps[2].to_string(),
    })
}

//! Turns raw listing candidates into canonical [`Event`]s.
//!
//! Month precedence: bucket hint, then a month word in the day label.
//! Year precedence: bucket hint, then the context's fallback year.

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use chrono_tz::Tz;

use crate::models::{Event, RawCandidate};
use crate::scraping::{base, months};

/// Timezone of the theater; decides which year "now" is.
pub const TIMEZONE: Tz = chrono_tz::Europe::Minsk;

#[derive(Clone, Debug)]
pub struct AssemblyContext {
    base_url: String,
    fallback_year: i32,
}

impl AssemblyContext {
    pub fn new(base_url: &str, fallback_year: i32) -> Result<Self> {
        reqwest::Url::parse(base_url).with_context(|| format!("invalid page url {base_url}"))?;
        Ok(Self {
            base_url: base_url.to_string(),
            fallback_year,
        })
    }

    /// Context for a run happening now.
    pub fn current(base_url: &str) -> Result<Self> {
        Self::new(base_url, current_year())
    }
}

pub fn current_year() -> i32 {
    Utc::now().with_timezone(&TIMEZONE).year()
}

pub fn identity_key(date: &str, time: &str, title: &str, url: &str) -> String {
    format!("{date} {time} | {title} | {url}")
}

/// Builds the event, or `None` when a required field cannot be resolved.
pub fn assemble(candidate: &RawCandidate, context: &AssemblyContext) -> Option<Event> {
    let day = months::extract_day(&candidate.day_text).map(|day| months::pad_day(&day))?;

    let month = match &candidate.hint {
        Some(hint) => hint.month.clone(),
        None => {
            let word = months::extract_month_word(&candidate.day_text)?;
            months::resolve_month(word)?.to_string()
        }
    };

    let year = match &candidate.hint {
        Some(hint) => hint.year.clone(),
        None => format!("{:04}", context.fallback_year),
    };

    if day.is_empty() || month.is_empty() || year.is_empty() {
        return None;
    }

    let time = base::normalize(&candidate.time_text);
    if time.is_empty() {
        return None;
    }

    let title = base::normalize(&candidate.title_text);
    if title.is_empty() {
        return None;
    }

    let url = base::absolute_url(&context.base_url, &candidate.href)?;

    let date = format!("{day}.{month}.{year}");
    let identity_key = identity_key(&date, &time, &title, &url);

    Some(Event {
        date,
        time,
        title,
        url,
        identity_key,
    })
}

pub mod assemble;
pub mod config;
pub mod fetch;
pub mod models;
pub mod novelty;
pub mod scheduler;
pub mod scraping;
pub mod seen;
pub mod telegram;
pub mod watcher;

use std::path::Path;

use anyhow::{Context, Result};

use assemble::AssemblyContext;
use fetch::PageFetcher;
use models::Event;

pub use config::{AppConfig, ConfigError};
pub use watcher::{RunOutcome, Watcher};

/// Events currently listed on the page, without notifying or persisting anything.
pub fn preview(afisha_url: &str, html_file: Option<&Path>) -> Result<Vec<Event>> {
    let html = match html_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?,
        None => fetch::HttpFetcher.fetch(afisha_url)?,
    };
    let context = AssemblyContext::current(afisha_url)?;
    Ok(scraping::parse_page(&html, &context))
}

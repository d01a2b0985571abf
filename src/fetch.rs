use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CACHE_CONTROL};

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:129.0) Gecko/20100101 Firefox/129.0";
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Source of the raw afisha page.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher;

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        fetch_html(url)
    }
}

static CLIENT: Lazy<Result<Client, String>> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ru,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .map_err(|err| err.to_string())
});

pub fn fetch_html(url: &str) -> Result<String> {
    let client = match &*CLIENT {
        Ok(client) => client,
        Err(err) => return Err(anyhow!("http client unavailable: {err}")),
    };

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("request failed for {url}"))?;
    let response = response
        .error_for_status()
        .with_context(|| format!("non-success status for {url}"))?;
    response
        .text()
        .with_context(|| format!("unable to read response body for {url}"))
}

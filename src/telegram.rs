use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::Event;

const API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const HEADER: &str = "Новая запись в афише!";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("http error: {0}")]
    Http(String),
    #[error("telegram api error: {0}")]
    Api(String),
}

/// One-way outbound channel for announcements.
pub trait Notifier {
    fn send(&self, text: &str) -> Result<(), TelegramError>;
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

static CLIENT: Lazy<Result<Client, String>> = Lazy::new(|| {
    Client::builder()
        .timeout(SEND_TIMEOUT)
        .build()
        .map_err(|err| err.to_string())
});

pub struct TelegramNotifier {
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.telegram_bot_token, &config.telegram_chat_id)
    }

    pub fn new(token: &str, chat_id: &str) -> Self {
        Self {
            token: token.trim().to_string(),
            chat_id: chat_id.trim().to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/bot{}/sendMessage", self.token)
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, text: &str) -> Result<(), TelegramError> {
        let client = match &*CLIENT {
            Ok(client) => client,
            Err(err) => return Err(TelegramError::Http(err.clone())),
        };
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = client
            .post(self.endpoint())
            .json(&payload)
            .send()
            // reqwest errors embed the url, which carries the token
            .map_err(|err| TelegramError::Http(err.without_url().to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .map_err(|err| TelegramError::Http(err.without_url().to_string()))?;

        let accepted = body.get("ok").and_then(|val| val.as_bool()).unwrap_or(false);
        if !status.is_success() || !accepted {
            let description = body
                .get("description")
                .and_then(|val| val.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            return Err(TelegramError::Api(format!("{status}: {description}")));
        }

        Ok(())
    }
}

/// Announcement text for one event, in Telegram's HTML parse mode.
pub fn render_message(event: &Event) -> String {
    format!(
        "<b>{}</b>\n{} {}\n{}\n{}",
        HEADER,
        escape_html(&event.date),
        escape_html(&event.time),
        escape_html(&event.title),
        escape_html(&event.url),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

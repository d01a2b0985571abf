use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_AFISHA_URL: &str = "https://puppet-minsk.com/bilety/afisha";
const DEFAULT_SEEN_FILE: &str = "data/seen.json";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 900;
const DEFAULT_COMMIT_MESSAGE: &str = "update seen.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitConfig {
    pub push: bool,
    pub message: String,
    /// Committer identity; falls back to the repository's git config when unset.
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub afisha_url: String,
    #[serde(skip_serializing)]
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub seen_file: PathBuf,
    pub poll_interval_secs: u64,
    pub debug: bool,
    pub git: Option<GitConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(lookup(key));

        let afisha_url = get("AFISHA_URL").unwrap_or_else(|| DEFAULT_AFISHA_URL.to_string());
        if reqwest::Url::parse(&afisha_url).is_err() {
            return Err(ConfigError::Invalid {
                key: "AFISHA_URL",
                value: afisha_url,
            });
        }

        let telegram_bot_token =
            get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let telegram_chat_id =
            get("TELEGRAM_CHAT_ID").ok_or(ConfigError::Missing("TELEGRAM_CHAT_ID"))?;

        let seen_file = get("SEEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SEEN_FILE));

        let poll_interval_secs = match get("POLL_INTERVAL") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "POLL_INTERVAL",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_POLL_INTERVAL_SECS,
        };

        let debug = parse_flag("DEBUG", get("DEBUG"))?;
        let git = if parse_flag("GIT_COMMIT", get("GIT_COMMIT"))? {
            Some(GitConfig {
                push: parse_flag("GIT_PUSH", get("GIT_PUSH"))?,
                message: get("GIT_COMMIT_MESSAGE")
                    .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
                user_name: get("GIT_USER_NAME"),
                user_email: get("GIT_USER_EMAIL"),
            })
        } else {
            None
        };

        Ok(Self {
            afisha_url,
            telegram_bot_token,
            telegram_chat_id,
            seen_file,
            poll_interval_secs,
            debug,
            git,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Reads a single on/off variable with the same rules as [`AppConfig::from_env`].
pub fn env_flag(key: &'static str) -> Result<bool, ConfigError> {
    parse_flag(key, non_blank(std::env::var(key).ok()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}

//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;

use crate::services::PROGRESS_WINDOW_DAYS;

/// Default backend for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (no trailing slash)
    pub api_url: String,
    /// Where the session (token + user) is persisted
    pub session_file: PathBuf,
    /// Emit logs as JSON instead of compact text
    pub log_json: bool,
    /// Days in the rolling progress window
    pub progress_window_days: u32,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: PathBuf::from("session.json"),
            log_json: false,
            progress_window_days: PROGRESS_WINDOW_DAYS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = normalize_api_url(
            &env::var("HABIT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        )?;

        let session_file = match env::var("HABIT_SESSION_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => dirs::data_local_dir()
                .map(|dir| dir.join("habit-tracker").join("session.json"))
                .ok_or(ConfigError::Missing("HABIT_SESSION_FILE"))?,
        };

        let log_json = env::var("HABIT_LOG_FORMAT")
            .map(|v| v.trim().eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let progress_window_days = match env::var("HABIT_PROGRESS_WINDOW_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or(ConfigError::Invalid {
                    name: "HABIT_PROGRESS_WINDOW_DAYS",
                    reason: format!("expected a positive number of days, got '{}'", raw),
                })?,
            Err(_) => PROGRESS_WINDOW_DAYS,
        };

        Ok(Self {
            api_url,
            session_file,
            log_json,
            progress_window_days,
        })
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            name: "HABIT_API_URL",
            reason: format!("'{}' is not an http(s) URL", raw),
        });
    }
    Ok(url.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

//! Runtime configuration, read once at startup and injected into the
//! pipeline and the server.

use dossier_sdk::{google::GeminiServiceOptions, RetryPolicy};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use thiserror::Error;

const API_KEY_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "API_KEY"];
const PLACEHOLDER_KEYS: [&str; 5] = ["undefined", "null", "api_key", "your_api_key", "changeme"];
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API_KEY_MISSING: set GEMINI_API_KEY (or GOOGLE_API_KEY / API_KEY)")]
    MissingApiKey,
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub text_model: Option<String>,
    pub speech_model: Option<String>,
    pub voice_name: Option<String>,
    pub retry: RetryPolicy,
    /// Where the CLI writes WAV and PDF exports.
    pub output_dir: PathBuf,
    pub bind_addr: SocketAddr,
}

impl StudioConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|&key| read(key).filter(|value| !is_placeholder(value)))
            .ok_or(ConfigError::MissingApiKey)?;

        let defaults = RetryPolicy::default();
        let max_retries = match read("DOSSIER_RETRY_MAX") {
            Some(value) => parse("DOSSIER_RETRY_MAX", value)?,
            None => defaults.max_retries,
        };
        let base_delay = match read("DOSSIER_RETRY_BASE_MS") {
            Some(value) => Duration::from_millis(parse("DOSSIER_RETRY_BASE_MS", value)?),
            None => defaults.base_delay,
        };

        let bind_addr = parse(
            "DOSSIER_BIND_ADDR",
            read("DOSSIER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        Ok(Self {
            api_key,
            base_url: read("GEMINI_BASE_URL"),
            text_model: read("DOSSIER_TEXT_MODEL"),
            speech_model: read("DOSSIER_SPEECH_MODEL"),
            voice_name: read("DOSSIER_VOICE"),
            retry: RetryPolicy::new(max_retries, base_delay),
            output_dir: read("DOSSIER_OUTPUT_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from),
            bind_addr,
        })
    }

    #[must_use]
    pub fn gemini_options(&self) -> GeminiServiceOptions {
        GeminiServiceOptions {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            text_model: self.text_model.clone(),
            speech_model: self.speech_model.clone(),
            voice_name: self.voice_name.clone(),
            client: None,
        }
    }
}

fn is_placeholder(key: &str) -> bool {
    PLACEHOLDER_KEYS
        .iter()
        .any(|placeholder| key.eq_ignore_ascii_case(placeholder))
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

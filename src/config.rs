//! Configuration management for the OCR upload server

use std::env;
use std::time::Duration;

use axum::http::HeaderValue;

/// Default listen port, matching what the upload frontend targets
pub const DEFAULT_PORT: u16 = 5000;

/// Default request body cap: 10MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default longest side an image may have before it is downscaled
pub const DEFAULT_MAX_DIMENSION: u32 = 2000;

/// Default wall-clock bound on a single engine invocation
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;

/// Default wall-clock bound on one chat completion call
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub draft: DraftConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// The one browser origin allowed through CORS. `*` allows any origin.
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Engine executable, either a bare name looked up on PATH or a full path
    pub command: String,
    pub language: String,
    pub timeout: Duration,
    /// Images larger than this on either side are shrunk to fit. `None` disables.
    pub max_dimension: Option<u32>,
}

/// Chat API used to draft emails. Drafting is off without an API key.
#[derive(Debug, Clone)]
pub struct DraftConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub sender_name: Option<String>,
    /// Lines about the sender, `|` separated in the environment
    pub sender_about: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
                cors_origin: "http://localhost:3000".to_string(),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            ocr: OcrConfig {
                command: "tesseract".to_string(),
                language: "eng".to_string(),
                timeout: Duration::from_secs(DEFAULT_OCR_TIMEOUT_SECS),
                max_dimension: Some(DEFAULT_MAX_DIMENSION),
            },
            draft: DraftConfig {
                api_base: "https://openrouter.ai/api/v1".to_string(),
                api_key: None,
                model: "gpt-3.5-turbo".to_string(),
                timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
                sender_name: None,
                sender_about: None,
            },
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let cors_origin = lookup("CORS_ORIGIN").unwrap_or(defaults.server.cors_origin);
        if cors_origin != "*" {
            HeaderValue::from_str(&cors_origin).map_err(|e| ConfigError::Invalid {
                key: "CORS_ORIGIN",
                value: cors_origin.clone(),
                reason: e.to_string(),
            })?;
        }

        let max_dimension = match parse_var::<u32, _>(&lookup, "OCR_MAX_DIMENSION")? {
            Some(0) => None,
            Some(n) => Some(n),
            None => defaults.ocr.max_dimension,
        };

        Ok(Config {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or(defaults.server.host),
                port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.server.port),
                cors_origin,
                max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES")?
                    .unwrap_or(defaults.server.max_upload_bytes),
            },
            ocr: OcrConfig {
                command: lookup("TESSERACT_CMD").unwrap_or(defaults.ocr.command),
                language: lookup("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                timeout: parse_var(&lookup, "OCR_TIMEOUT_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.ocr.timeout),
                max_dimension,
            },
            draft: DraftConfig {
                api_base: lookup("CHAT_API_BASE").unwrap_or(defaults.draft.api_base),
                api_key: non_empty(lookup("OPENAI_API_KEY")),
                model: lookup("CHAT_MODEL").unwrap_or(defaults.draft.model),
                timeout: parse_var(&lookup, "CHAT_TIMEOUT_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.draft.timeout),
                sender_name: non_empty(lookup("SENDER_NAME")),
                sender_about: non_empty(lookup("SENDER_ABOUT")).map(|about| about.replace('|', "\n")),
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

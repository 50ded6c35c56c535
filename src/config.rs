//! Console configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

const STORAGE_DIR: &str = ".admin-console";
const STORAGE_FILE: &str = "storage.json";

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A boolean switch holds text that is neither truthy nor falsy.
    #[error("invalid boolean for {var}: {value:?}")]
    InvalidBool { var: &'static str, value: String },
}

/// Transport settings for the REST backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ApiConfig {
    /// Config pointing at `base_url` with default timeouts.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    /// Skip the backend entirely and serve the fallback identity.
    pub use_mock_api: bool,
    /// File backing the persisted key-value store.
    pub storage_path: PathBuf,
}

impl ConsoleConfig {
    /// Build typed console config from environment variables.
    ///
    /// - `CONSOLE_API_URL`: default `http://localhost:3001/api`
    /// - `CONSOLE_USE_MOCK_API`: `1/true/yes/on` or `0/false/no/off`, default false
    /// - `CONSOLE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CONSOLE_CONNECT_TIMEOUT_SECS`: default 5
    /// - `CONSOLE_STORAGE_PATH`: default `$HOME/.admin-console/storage.json`
    ///
    /// # Errors
    ///
    /// Returns an error if `CONSOLE_USE_MOCK_API` is set to an unrecognized value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("CONSOLE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let use_mock_api = match std::env::var("CONSOLE_USE_MOCK_API") {
            Ok(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool { var: "CONSOLE_USE_MOCK_API", value: raw })?,
            Err(_) => false,
        };
        let api = ApiConfig {
            base_url: normalize_base_url(&base_url),
            request_timeout: Duration::from_secs(env_parse_u64(
                "CONSOLE_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(env_parse_u64(
                "CONSOLE_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
        };
        let storage_path = std::env::var_os("CONSOLE_STORAGE_PATH").map_or_else(default_storage_path, PathBuf::from);

        Ok(Self { api, use_mock_api, storage_path })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

/// Trim surrounding whitespace and any trailing `/`.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn default_storage_path() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(STORAGE_DIR).join(STORAGE_FILE)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

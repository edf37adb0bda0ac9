//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `TAMARIND_API_BASE_URL` - Backend API base URL
//!   (default: `http://127.0.0.1:5000/api/`)
//! - `TAMARIND_DATA_DIR` - Directory for durable client state
//!   (default: `.tamarind`)
//! - `TAMARIND_ADMIN_SECRET` - Secret for admin mutations; admin
//!   operations fail locally when unset
//! - `TAMARIND_SYNC_POLL_MS` - Promotion marker poll interval in
//!   milliseconds (default: 1000)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api/";
const DEFAULT_DATA_DIR: &str = ".tamarind";
const DEFAULT_SYNC_POLL_MS: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend API base URL. Always ends with a trailing slash so
    /// endpoint paths join onto it cleanly.
    pub api_base_url: Url,
    /// Directory holding the durable slots (cart, promotion marker).
    pub data_dir: PathBuf,
    /// Admin secret sent as `X-Admin-Secret` on admin mutations.
    pub admin_secret: Option<SecretString>,
    /// How often the marker watcher polls for other contexts' publishes.
    pub sync_poll_interval: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("data_dir", &self.data_dir)
            .field(
                "admin_secret",
                &self.admin_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sync_poll_interval", &self.sync_poll_interval)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_env_or_default(
            "TAMARIND_API_BASE_URL",
            DEFAULT_API_BASE_URL,
        ))
        .map_err(|e| {
            ConfigError::InvalidEnvVar("TAMARIND_API_BASE_URL".to_string(), e.to_string())
        })?;

        let data_dir = PathBuf::from(get_env_or_default("TAMARIND_DATA_DIR", DEFAULT_DATA_DIR));

        let admin_secret = get_optional_env("TAMARIND_ADMIN_SECRET").map(SecretString::from);

        let poll_ms = match get_optional_env("TAMARIND_SYNC_POLL_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("TAMARIND_SYNC_POLL_MS".to_string(), e.to_string())
            })?,
            None => DEFAULT_SYNC_POLL_MS,
        };

        Ok(Self {
            api_base_url,
            data_dir,
            admin_secret,
            sync_poll_interval: Duration::from_millis(poll_ms),
        })
    }
}

/// Parse a base URL, normalizing to a trailing slash so `Url::join`
/// appends endpoint paths instead of replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let url = parse_base_url("http://localhost:5000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/");
        assert_eq!(url.join("menu").unwrap().path(), "/api/menu");
    }

    #[test]
    fn test_base_url_keeps_existing_trailing_slash() {
        let url = parse_base_url("http://localhost:5000/api/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/");
    }

    #[test]
    fn test_debug_redacts_admin_secret() {
        let config = ClientConfig {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).unwrap(),
            data_dir: PathBuf::from(".tamarind"),
            admin_secret: Some(SecretString::from("super-secret-value")),
            sync_poll_interval: Duration::from_millis(1000),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-value"));
    }
}

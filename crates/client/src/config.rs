//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GEARHUB_API_URL` - API base URL (default: `http://localhost:8080/api/v1`)
//! - `GEARHUB_DEMO_FALLBACK` - serve demo data when the backend is down (default: false)
//! - `GEARHUB_HTTP_TIMEOUT_SECS` - per-request timeout in seconds (default: 30)
//! - `GEARHUB_SESSION_FILE` - where the session is persisted (default: `.gearhub/session.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Base URL used when `GEARHUB_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
/// Request timeout used when `GEARHUB_HTTP_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Session file used when `GEARHUB_SESSION_FILE` is unset.
pub const DEFAULT_SESSION_FILE: &str = ".gearhub/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// GearHub client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub base_url: Url,
    /// Whether login and product listing may fall back to demo data
    pub demo_fallback: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Durable session location
    pub session_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Configuration for `base_url` with every other setting at its default.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            demo_fallback: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            sentry_dsn: None,
        }
    }

    /// Enable or disable the demo fallback.
    #[must_use]
    pub const fn with_demo_fallback(mut self, enabled: bool) -> Self {
        self.demo_fallback = enabled;
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables, reading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = get_or_default(&lookup, "GEARHUB_API_URL", DEFAULT_API_URL);
        let base_url = Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("GEARHUB_API_URL".to_string(), e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "GEARHUB_API_URL".to_string(),
                format!("unsupported scheme: {}", base_url.scheme()),
            ));
        }

        let demo_fallback = match lookup("GEARHUB_DEMO_FALLBACK") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "GEARHUB_DEMO_FALLBACK".to_string(),
                    format!("expected true or false, got {value}"),
                )
            })?,
            None => false,
        };

        let timeout_secs = get_or_default(
            &lookup,
            "GEARHUB_HTTP_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("GEARHUB_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "GEARHUB_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let session_file = PathBuf::from(get_or_default(
            &lookup,
            "GEARHUB_SESSION_FILE",
            DEFAULT_SESSION_FILE,
        ));

        Ok(Self {
            base_url,
            demo_fallback,
            timeout: Duration::from_secs(timeout_secs),
            session_file,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }
}

/// Get a variable with a default value.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

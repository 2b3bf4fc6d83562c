//! Runtime configuration
//!
//! Loads origin endpoints, the forecast timezone, the cache and history
//! directories and the HTTP timeout from environment variables (with `.env`
//! support). CLI flags are applied on top by the binary.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Registry base URL used when `HOLOCAST_SWAPI_URL` is unset
pub const DEFAULT_SWAPI_URL: &str = "https://www.swapi.tech/api";

/// Open-Meteo base URL used when `HOLOCAST_OPEN_METEO_URL` is unset
pub const DEFAULT_OPEN_METEO_URL: &str = "https://api.open-meteo.com";

/// Forecast timezone used when `HOLOCAST_TIMEZONE` is unset
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Per-request timeout used when `HOLOCAST_REQUEST_TIMEOUT_SECS` is unset
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors for malformed configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The timeout is not a positive whole number of seconds
    #[error("Invalid HOLOCAST_REQUEST_TIMEOUT_SECS: '{0}' (expected a positive integer)")]
    InvalidTimeout(String),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub swapi_base_url: String,
    pub open_meteo_base_url: String,
    pub timezone: String,
    /// Cache directory override; `None` means the XDG default
    pub cache_dir: Option<PathBuf>,
    /// History directory override; `None` means the XDG data dir
    pub history_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            swapi_base_url: DEFAULT_SWAPI_URL.to_string(),
            open_meteo_base_url: DEFAULT_OPEN_METEO_URL.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            cache_dir: None,
            history_dir: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Load configuration from the process environment and an optional `.env` file
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Config::default();

        if let Some(url) = var("HOLOCAST_SWAPI_URL") {
            config.swapi_base_url = url;
        }
        if let Some(url) = var("HOLOCAST_OPEN_METEO_URL") {
            config.open_meteo_base_url = url;
        }
        if let Some(timezone) = var("HOLOCAST_TIMEZONE") {
            config.timezone = timezone;
        }
        config.cache_dir = var("HOLOCAST_CACHE_DIR").map(PathBuf::from);
        config.history_dir = var("HOLOCAST_HISTORY_DIR").map(PathBuf::from);

        if let Some(raw) = var("HOLOCAST_REQUEST_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

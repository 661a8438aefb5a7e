//! Process configuration parsed from environment variables.
//!
//! Everything has a default so `sidebar` starts with no environment at all.
//! The travel tracker is the exception: without `SIDEBAR_API_KEY` it stays
//! registered but never polls.

use std::path::PathBuf;

use deck::bounds::Size;

pub const DEFAULT_STORE_PATH: &str = "sidebar-store.json";
pub const DEFAULT_NAMESPACE: &str = "sidebar";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/v1";
pub const DEFAULT_TRIP: &str = "current";
pub const DEFAULT_CONTAINER_WIDTH: f64 = 320.0;
pub const DEFAULT_CONTAINER_HEIGHT: f64 = 900.0;
pub const DEFAULT_TICK_MS: u64 = 50;
pub const DEFAULT_POLL_TTL_MS: u64 = 60_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub namespace: String,
    pub api_url: String,
    pub api_key: Option<String>,
    pub trip: String,
    pub container: Size,
    pub tick_ms: u64,
    pub poll_ttl_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            namespace: DEFAULT_NAMESPACE.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            trip: DEFAULT_TRIP.to_string(),
            container: Size::new(DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT),
            tick_ms: DEFAULT_TICK_MS,
            poll_ttl_ms: DEFAULT_POLL_TTL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `SIDEBAR_STORE_PATH`: JSON file shared by every sidebar process
    /// - `SIDEBAR_NAMESPACE`: key prefix inside the store
    /// - `SIDEBAR_API_URL`: travel API base URL
    /// - `SIDEBAR_API_KEY`: travel API credential; polling is off without it
    /// - `SIDEBAR_TRIP`: trip id to track
    /// - `SIDEBAR_CONTAINER_WIDTH` / `SIDEBAR_CONTAINER_HEIGHT`: sidebar size in px
    /// - `SIDEBAR_TICK_MS`: scheduler tick
    /// - `SIDEBAR_POLL_TTL_MS`: travel data freshness window
    /// - `SIDEBAR_REQUEST_TIMEOUT_SECS`: HTTP timeout
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for non-positive sizes or a zero tick.
    pub fn from_env() -> Result<Self, ConfigError> {
        let width = env_parse("SIDEBAR_CONTAINER_WIDTH", DEFAULT_CONTAINER_WIDTH);
        let height = env_parse("SIDEBAR_CONTAINER_HEIGHT", DEFAULT_CONTAINER_HEIGHT);
        if !(width.is_finite() && width > 0.0) {
            return Err(ConfigError::Invalid { var: "SIDEBAR_CONTAINER_WIDTH", reason: "must be a positive number" });
        }
        if !(height.is_finite() && height > 0.0) {
            return Err(ConfigError::Invalid { var: "SIDEBAR_CONTAINER_HEIGHT", reason: "must be a positive number" });
        }
        let tick_ms = env_parse("SIDEBAR_TICK_MS", DEFAULT_TICK_MS);
        if tick_ms == 0 {
            return Err(ConfigError::Invalid { var: "SIDEBAR_TICK_MS", reason: "must be greater than zero" });
        }

        Ok(Self {
            store_path: std::env::var("SIDEBAR_STORE_PATH")
                .map_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from),
            namespace: std::env::var("SIDEBAR_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string()),
            api_url: std::env::var("SIDEBAR_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: std::env::var("SIDEBAR_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            trip: std::env::var("SIDEBAR_TRIP").unwrap_or_else(|_| DEFAULT_TRIP.to_string()),
            container: Size::new(width, height),
            tick_ms,
            poll_ttl_ms: env_parse("SIDEBAR_POLL_TTL_MS", DEFAULT_POLL_TTL_MS),
            request_timeout_secs: env_parse("SIDEBAR_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

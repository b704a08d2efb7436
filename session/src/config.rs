//! Client-side session configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::context::DEFAULT_WATCHDOG_INTERVAL;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Base URL of the REST backend, without a trailing slash.
    pub backend_url: String,
    /// Cadence of the expiry watchdog.
    pub watchdog_interval: Duration,
    /// JSON file backing the local store; in-memory when unset.
    pub storage_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            watchdog_interval: DEFAULT_WATCHDOG_INTERVAL,
            storage_path: None,
        }
    }
}

impl SessionConfig {
    /// Optional:
    /// - `BACKEND_URL`: default `http://127.0.0.1:8080/api`
    /// - `SESSION_WATCHDOG_SECS`: default 60; `0` keeps the default
    /// - `SESSION_STORAGE_PATH`: local store file
    #[must_use]
    pub fn from_env() -> Self {
        let backend_url = std::env::var("BACKEND_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let secs = env_parse("SESSION_WATCHDOG_SECS", DEFAULT_WATCHDOG_INTERVAL.as_secs());
        let watchdog_interval = if secs == 0 { DEFAULT_WATCHDOG_INTERVAL } else { Duration::from_secs(secs) };
        let storage_path = std::env::var("SESSION_STORAGE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self { backend_url, watchdog_interval, storage_path }
    }
}

pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

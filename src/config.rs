use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const API_URL_ENV: &str = "CYBERNEWS_API_URL";
pub const TIMEOUT_ENV: &str = "CYBERNEWS_TIMEOUT_SECS";

/// Connection settings for the news backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL without a trailing slash, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Reads `CYBERNEWS_API_URL` and `CYBERNEWS_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = match env::var(TIMEOUT_ENV) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("{TIMEOUT_ENV} must be a number of seconds, got {raw:?}")))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self::new(&base_url, timeout_secs)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("invalid API base URL {raw:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!("API base URL must be http(s), got {raw:?}")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let cfg = Config::new("http://news.local:8000/", 5).unwrap();
        assert_eq!(cfg.base_url, "http://news.local:8000");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn keeps_path_prefix() {
        let cfg = Config::new("https://example.com/backend", 15).unwrap();
        assert_eq!(cfg.base_url, "https://example.com/backend");
    }

    #[test]
    fn rejects_garbage_and_other_schemes() {
        assert!(matches!(Config::new("not a url", 15), Err(Error::Config(_))));
        assert!(matches!(Config::new("ftp://example.com", 15), Err(Error::Config(_))));
    }
}

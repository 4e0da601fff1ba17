//! Environment configuration for the search function.

use std::fmt;
use std::time::Duration;

use agentbridge_core::ConfigError;
use url::Url;

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct SearchConfig {
    pub api_key: String,
    /// `{YOUTUBE_API_BASE}/search`.
    pub search_url: Url,
    pub timeout: Duration,
}

impl SearchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("YOUTUBE_API_KEY").ok_or(ConfigError::Missing("YOUTUBE_API_KEY"))?;

        let mut base = get("YOUTUBE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        if !base.ends_with('/') {
            base.push('/');
        }
        let search_url = Url::parse(&base)
            .and_then(|api_base| api_base.join("search"))
            .map_err(|e| ConfigError::invalid("YOUTUBE_API_BASE", e))?;

        let timeout_secs = match get("SEARCH_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::invalid("SEARCH_TIMEOUT_SECS", e))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            search_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &"<redacted>")
            .field("search_url", &self.search_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

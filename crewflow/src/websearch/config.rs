//! Configuration types for web search and fetching.

use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Browser-like user agent; several sites refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Default character bound for fetched page text.
pub const DEFAULT_MAX_CHARS: usize = 8000;

/// Default number of search results.
pub const DEFAULT_MAX_RESULTS: usize = 6;

/// Upper bound for `max_results`.
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Configuration for page fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Character bound applied when the caller gives none.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Retry policy for retryable status codes.
    #[serde(default = "default_fetch_retry")]
    pub retry: RetryConfig,
    /// Status codes that trigger a retry.
    #[serde(default = "default_retry_status_codes")]
    pub retry_status_codes: HashSet<u16>,
}

fn default_fetch_timeout() -> f64 {
    12.0
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_fetch_retry() -> RetryConfig {
    RetryConfig::default().with_max_retries(1)
}

fn default_retry_status_codes() -> HashSet<u16> {
    [429, 500, 502, 503, 504].into_iter().collect()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_fetch_timeout(),
            user_agent: default_user_agent(),
            max_chars: default_max_chars(),
            retry: default_fetch_retry(),
            retry_status_codes: default_retry_status_codes(),
        }
    }
}

impl FetchConfig {
    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        timeout_or_default(self.timeout_seconds, default_fetch_timeout())
    }

    /// Whether a status code should trigger a retry.
    #[must_use]
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }
}

/// Configuration for the search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// HTML search endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    /// Region code (`wt-wt` is "no region").
    #[serde(default = "default_region")]
    pub region: String,
    /// Safe-search level as the endpoint expects it (`-1` is moderate).
    #[serde(default = "default_safe_search")]
    pub safe_search: String,
    /// Request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Result count used when the caller gives none.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}

fn default_region() -> String {
    "wt-wt".to_string()
}

fn default_safe_search() -> String {
    "-1".to_string()
}

fn default_search_timeout() -> f64 {
    15.0
}

const fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            region: default_region(),
            safe_search: default_safe_search(),
            timeout_seconds: default_search_timeout(),
            user_agent: default_user_agent(),
            max_results: default_max_results(),
        }
    }
}

impl SearchConfig {
    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        timeout_or_default(self.timeout_seconds, default_search_timeout())
    }
}

/// Negative, non-finite and out-of-range values fall back to `default`.
fn timeout_or_default(seconds: f64, default: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or_else(|_| Duration::from_secs_f64(default))
}

/// Clamps a requested result count to `1..=MAX_SEARCH_RESULTS`.
#[must_use]
pub fn clamp_max_results(requested: usize) -> usize {
    requested.clamp(1, MAX_SEARCH_RESULTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(12));
        assert_eq!(config.max_chars, 8000);
        assert_eq!(config.retry.max_retries, 1);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert!(config.should_retry_status(503));
        assert!(!config.should_retry_status(404));
    }

    #[test]
    fn test_fetch_config_deserializes_partial() {
        let config: FetchConfig = serde_json::from_str(r#"{"timeout_seconds": 3.5}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(3500));
        assert_eq!(config.max_chars, DEFAULT_MAX_CHARS);
    }

    #[test]
    fn test_unusable_timeouts_fall_back_to_defaults() {
        for seconds in [f64::INFINITY, f64::NAN, -1.0, 1e30] {
            assert_eq!(
                FetchConfig::default().with_timeout(seconds).timeout(),
                Duration::from_secs(12)
            );
            let search = SearchConfig {
                timeout_seconds: seconds,
                ..SearchConfig::default()
            };
            assert_eq!(search.timeout(), Duration::from_secs(15));
        }
    }

    #[test]
    fn test_search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.endpoint, "https://html.duckduckgo.com/html/");
        assert_eq!(config.region, "wt-wt");
        assert_eq!(config.max_results, 6);
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_clamp_max_results() {
        assert_eq!(clamp_max_results(0), 1);
        assert_eq!(clamp_max_results(6), 6);
        assert_eq!(clamp_max_results(500), MAX_SEARCH_RESULTS);
    }
}

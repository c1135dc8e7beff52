//! Page fetching that never fails.

use super::config::FetchConfig;
use super::extract::clean_text;
use crate::retry::with_retry;
use tracing::{debug, warn};

/// Prefix of the string returned when a fetch fails.
pub const FETCH_ERROR_MARKER: &str = "[fetch_error]";

/// Builds an HTTP client with the given timeout and user agent.
///
/// Falls back to a default client if the builder rejects the settings.
#[must_use]
pub fn build_http_client(timeout: std::time::Duration, user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Fetches pages and reduces them to bounded visible text.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl Fetcher {
    /// Creates a fetcher with its own HTTP client.
    #[must_use]
    pub fn new(config: FetchConfig) -> Self {
        let client = build_http_client(config.timeout(), &config.user_agent);
        Self { client, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches `url` and returns at most `max_chars` characters of visible text.
    ///
    /// Any transport, status or body failure yields
    /// `"[fetch_error] <detail>"` instead of an error.
    pub async fn fetch(&self, url: &str, max_chars: usize) -> String {
        match self.fetch_body(url).await {
            Ok(body) => {
                let text = clean_text(&body, max_chars);
                debug!(url = %url, chars = text.chars().count(), "Fetched page");
                text
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch failed");
                format!("{FETCH_ERROR_MARKER} {e}")
            }
        }
    }

    async fn fetch_body(&self, url: &str) -> Result<String, reqwest::Error> {
        let is_retryable = |e: &reqwest::Error| {
            e.status()
                .is_some_and(|status| self.config.should_retry_status(status.as_u16()))
        };

        with_retry(&self.config.retry, url, is_retryable, || async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            response.text().await
        })
        .await
    }
}

/// Returns true if `text` is a fetch failure sentinel.
#[must_use]
pub fn is_fetch_error(text: &str) -> bool {
    text.starts_with(FETCH_ERROR_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{JitterStrategy, RetryConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_fetcher(max_retries: usize) -> Fetcher {
        Fetcher::new(FetchConfig::default().with_timeout(5.0).with_retry(
            RetryConfig::default()
                .with_max_retries(max_retries)
                .with_base_delay_ms(0)
                .with_jitter(JitterStrategy::None),
        ))
    }

    #[tokio::test]
    async fn test_fetch_returns_visible_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><script>x()</script><h1>Title</h1><p>Body text</p></body></html>",
            ))
            .mount(&server)
            .await;

        let text = fast_fetcher(0)
            .fetch(&format!("{}/article", server.uri()), 8000)
            .await;
        assert_eq!(text, "Title Body text");
    }

    #[tokio::test]
    async fn test_fetch_status_error_is_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let text = fast_fetcher(0).fetch(&server.uri(), 8000).await;
        assert!(is_fetch_error(&text), "got: {text}");
        assert!(text.contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_retries_server_errors_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>recovered</p>"))
            .mount(&server)
            .await;

        let text = fast_fetcher(1).fetch(&server.uri(), 8000).await;
        assert_eq!(text, "recovered");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_sentinel() {
        let fetcher = Fetcher::new(FetchConfig::default().with_timeout(2.0).with_retry(
            RetryConfig::default()
                .with_max_retries(0)
                .with_base_delay_ms(0)
                .with_jitter(JitterStrategy::None),
        ));

        let text = fetcher.fetch("http://127.0.0.1:1/", 8000).await;
        assert!(text.starts_with("[fetch_error] "), "got: {text}");
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_sentinel() {
        let text = fast_fetcher(0).fetch("not a url", 8000).await;
        assert!(text.starts_with("[fetch_error] "));
    }
}

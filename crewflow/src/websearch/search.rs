//! Key-less web search.

use super::config::{clamp_max_results, SearchConfig};
use super::fetcher::build_http_client;
use crate::errors::ToolError;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};
use url::Url;

/// One search hit, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title.
    pub title: Option<String>,
    /// Target URL.
    #[serde(alias = "href")]
    pub link: Option<String>,
    /// Short excerpt.
    pub snippet: Option<String>,
}

/// Trait for pluggable search providers.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Runs a query and returns at most `max_results` results.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, ToolError>;
}

// Selectors are literals, so parsing them cannot fail.
#[allow(clippy::expect_used)]
static RESULT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.result").expect("valid selector"));
#[allow(clippy::expect_used)]
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("valid selector"));
#[allow(clippy::expect_used)]
static SNIPPET_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__snippet").expect("valid selector"));

/// DuckDuckGo's HTML endpoint. Needs no API key.
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    config: SearchConfig,
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl DuckDuckGoProvider {
    /// Creates a provider with its own HTTP client.
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        let client = build_http_client(config.timeout(), &config.user_agent);
        Self { client, config }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "DuckDuckGo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, ToolError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", query),
                ("kl", self.config.region.as_str()),
                ("kp", self.config.safe_search.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ToolError::execution_failed("web_search", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::execution_failed(
                "web_search",
                format!("search endpoint returned {}", status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::execution_failed("web_search", format!("unreadable body: {e}")))?;

        Ok(parse_results(&body, max_results))
    }
}

/// Parses a DuckDuckGo HTML results page. Ads are skipped.
#[must_use]
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_SELECTOR)
        .filter(|node| !node.value().classes().any(|class| class == "result--ad"))
        .filter_map(|node| {
            let anchor = node.select(&TITLE_SELECTOR).next()?;
            Some(SearchResult {
                title: non_empty(element_text(anchor)),
                link: anchor.value().attr("href").and_then(decode_link),
                snippet: node
                    .select(&SNIPPET_SELECTOR)
                    .next()
                    .and_then(|snippet| non_empty(element_text(snippet))),
            })
        })
        .take(max_results)
        .collect()
}

/// Resolves DuckDuckGo redirect links (`//duckduckgo.com/l/?uddg=...`).
#[must_use]
pub fn decode_link(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let url = base.join(href).ok()?;

    if url.path().starts_with("/l/") {
        if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
            return Some(target.into_owned());
        }
    }
    Some(url.to_string())
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Search front end that never fails.
///
/// Wraps a [`SearchProvider`], clamps the result count and turns every
/// provider error into an empty result with a `warn` log.
#[derive(Clone)]
pub struct WebSearcher {
    provider: Arc<dyn SearchProvider>,
    default_max_results: usize,
}

impl std::fmt::Debug for WebSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSearcher")
            .field("provider", &self.provider.name())
            .field("default_max_results", &self.default_max_results)
            .finish()
    }
}

impl Default for WebSearcher {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl WebSearcher {
    /// Creates a searcher over any provider.
    #[must_use]
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            default_max_results: SearchConfig::default().max_results,
        }
    }

    /// Creates a DuckDuckGo-backed searcher.
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            provider: Arc::new(DuckDuckGoProvider::new(config.clone())),
            default_max_results: clamp_max_results(config.max_results),
        }
    }

    /// Result count used when the caller gives none.
    #[must_use]
    pub const fn default_max_results(&self) -> usize {
        self.default_max_results
    }

    /// Searches for `query`. An empty query returns no results without a request.
    pub async fn search(&self, query: &str, max_results: Option<usize>) -> Vec<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let limit = clamp_max_results(max_results.unwrap_or(self.default_max_results));
        match self.provider.search(query, limit).await {
            Ok(mut results) => {
                results.truncate(limit);
                debug!(
                    provider = self.provider.name(),
                    query = %query,
                    count = results.len(),
                    "Search completed"
                );
                results
            }
            Err(e) => {
                warn!(provider = self.provider.name(), query = %query, error = %e, "Search failed");
                Vec::new()
            }
        }
    }
}

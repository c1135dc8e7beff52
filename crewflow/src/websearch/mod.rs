//! Web search and page fetching.
//!
//! This module provides:
//! - Configuration for fetching and searching
//! - Visible-text extraction from HTML
//! - A fetcher that returns a sentinel string instead of failing
//! - A pluggable search provider with a DuckDuckGo implementation

mod config;
mod extract;
mod fetcher;
mod search;

pub use config::{
    clamp_max_results, FetchConfig, SearchConfig, DEFAULT_MAX_CHARS, DEFAULT_MAX_RESULTS,
    DEFAULT_USER_AGENT, MAX_SEARCH_RESULTS,
};
pub use extract::{clean_text, visible_text};
pub use fetcher::{build_http_client, is_fetch_error, Fetcher, FETCH_ERROR_MARKER};
pub use search::{decode_link, parse_results, DuckDuckGoProvider, SearchProvider, SearchResult, WebSearcher};

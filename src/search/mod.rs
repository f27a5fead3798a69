//! Search Module
//!
//! Web search and page extraction used by the research tooling:
//! - DuckDuckGo (HTML endpoint) - keyless general web search
//! - Page fetcher - downloads a result page and keeps its `<p>` text
//!
//! Neither component executes JavaScript or follows pagination.

pub mod duckduckgo;
pub mod fetch;

pub use duckduckgo::{DuckDuckGoClient, SearchResult};
pub use fetch::{extract_paragraphs, PageFetcher};

use thiserror::Error;

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Page fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Failed to parse search results: {0}")]
    ParseError(String),
}

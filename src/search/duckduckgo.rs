//! DuckDuckGo Client
//!
//! Queries the JavaScript-free HTML endpoint and scrapes the organic results.
//! Result links come back wrapped in a DuckDuckGo redirect
//! (`//duckduckgo.com/l/?uddg=<encoded target>`); those are unwrapped to the
//! real target URL.

use super::SearchError;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const DUCKDUCKGO_HTML_BASE: &str = "https://html.duckduckgo.com/html/";
/// Results kept per search
const MAX_RESULTS: usize = 5;
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// One organic search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    /// Target URL; `None` when the result carried no usable link
    pub link: Option<String>,
    pub snippet: String,
}

pub struct DuckDuckGoClient {
    client: Client,
    base_url: String,
}

impl DuckDuckGoClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: DUCKDUCKGO_HTML_BASE.to_string(),
        }
    }

    /// Point the client at a different endpoint (tests, self-hosted proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run a text search. An empty vector means the engine found nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        info!(query = %query, "Searching DuckDuckGo");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::RequestFailed(format!("DuckDuckGo returned {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        debug!(bytes = body.len(), "Raw DuckDuckGo response received");

        let results = parse_results(&body, MAX_RESULTS)?;
        info!(count = results.len(), "DuckDuckGo search completed");
        Ok(results)
    }
}

impl Default for DuckDuckGoClient {
    fn default() -> Self {
        Self::new()
    }
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::ParseError(format!("{}: {}", css, e)))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the HTML results page, skipping sponsored entries
pub(crate) fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    let doc = Html::parse_document(html);
    let result_sel = selector("div.result")?;
    let title_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut results = Vec::new();
    for result in doc.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let is_ad = result
            .value()
            .classes()
            .any(|class| class == "result--ad");
        if is_ad {
            continue;
        }

        let Some(anchor) = result.select(&title_sel).next() else {
            continue;
        };

        let title = element_text(anchor);
        let link = anchor.value().attr("href").and_then(resolve_link);
        let snippet = result
            .select(&snippet_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();

        results.push(SearchResult {
            title: if title.is_empty() { "No title".to_string() } else { title },
            link,
            snippet,
        });
    }

    Ok(results)
}

/// Unwrap DuckDuckGo redirect links; pass through plain absolute links
fn resolve_link(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let url = Url::parse(&absolute).ok()?;
    let is_redirect = url
        .host_str()
        .is_some_and(|host| host.ends_with("duckduckgo.com"))
        && url.path().starts_with("/l/");

    if is_redirect {
        return url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned());
    }

    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

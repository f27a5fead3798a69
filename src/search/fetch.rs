// Page fetching and paragraph extraction

use super::SearchError;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

pub const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Self {
        Self::with_timeout(PAGE_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Download `url` and return its paragraph text (see [`extract_paragraphs`])
    pub async fn fetch_article_text(&self, url: &str) -> Result<String, SearchError> {
        let fetch_failed = |reason: String| SearchError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_failed(e.to_string()))?;

        let body = response.text().await.map_err(|e| fetch_failed(e.to_string()))?;
        debug!(url = %url, bytes = body.len(), "Fetched page");

        extract_paragraphs(&body)
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Text of every `<p>` element, one per line, with the final paragraph
/// dropped: on most pages it is footer or cookie boilerplate.
pub fn extract_paragraphs(html: &str) -> Result<String, SearchError> {
    let doc = Html::parse_document(html);
    let p_sel = Selector::parse("p").map_err(|e| SearchError::ParseError(e.to_string()))?;

    let mut paragraphs: Vec<String> = doc
        .select(&p_sel)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .collect();
    paragraphs.pop();

    Ok(paragraphs
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

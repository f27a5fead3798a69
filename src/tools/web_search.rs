use super::Tool;
use crate::search::{DuckDuckGoClient, PageFetcher, SearchResult};
use crate::types::AppResult;
use async_trait::async_trait;
use tracing::{info, warn};

pub const NO_RESULTS: &str = "No results found for your query";
pub const NO_READABLE_ARTICLES: &str = "No readable articles found from the search results.";

/// Search the web and return the article text of each result.
///
/// Results are fetched one at a time. A result without a link, a failed
/// fetch, or a page with no paragraph text is skipped.
pub struct WebSearchTool {
    search: DuckDuckGoClient,
    fetcher: PageFetcher,
}

impl WebSearchTool {
    pub fn new(search: DuckDuckGoClient, fetcher: PageFetcher) -> Self {
        Self { search, fetcher }
    }

    async fn collect_articles(&self, results: &[SearchResult]) -> Vec<String> {
        let mut articles = Vec::new();

        for (i, result) in results.iter().enumerate() {
            let Some(link) = result.link.as_deref() else {
                continue;
            };

            info!(index = i + 1, title = %result.title, link = %link, "Fetching article");

            match self.fetcher.fetch_article_text(link).await {
                Ok(text) if !text.trim().is_empty() => {
                    articles.push(format_article(&result.title, link, &text));
                }
                Ok(_) => warn!(link = %link, "Skipping page with no readable paragraphs"),
                Err(e) => warn!(link = %link, error = %e, "Skipping article"),
            }
        }

        articles
    }
}

fn format_article(title: &str, link: &str, text: &str) -> String {
    format!("### {}\nSource: {}\n\n{}\n", title, link, text)
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information and return the text of the top articles."
    }

    async fn call(&self, query: &str) -> AppResult<String> {
        info!(query = %query, "Web search tool invoked");

        let results = self.search.search(query).await?;
        if results.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }
        info!(count = results.len(), "Retrieved search results");

        let articles = self.collect_articles(&results).await;
        if articles.is_empty() {
            return Ok(NO_READABLE_ARTICLES.to_string());
        }

        info!(count = articles.len(), "Extracted article content");
        Ok(articles.join("\n\n---\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppError;

    fn results_page(links: &[&str]) -> String {
        let items: String = links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                format!(
                    r#"<div class="result"><a class="result__a" href="{}">Result {}</a></div>"#,
                    link, i
                )
            })
            .collect();
        format!("<html><body>{}</body></html>", items)
    }

    #[tokio::test]
    async fn test_skips_failed_fetches() {
        let mut server = mockito::Server::new_async().await;
        let good = format!("{}/good", server.url());
        let bad = format!("{}/bad", server.url());

        server
            .mock("GET", "/html/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(results_page(&[&bad, &good]))
            .create_async()
            .await;
        server.mock("GET", "/bad").with_status(500).create_async().await;
        server
            .mock("GET", "/good")
            .with_status(200)
            .with_body("<p>Useful paragraph</p><p>footer</p>")
            .create_async()
            .await;

        let tool = WebSearchTool::new(
            DuckDuckGoClient::new().with_base_url(format!("{}/html/", server.url())),
            PageFetcher::new(),
        );

        let output = tool.call("rust").await.unwrap();
        assert!(output.starts_with("### Result 1\n"));
        assert!(output.contains("Useful paragraph"));
        assert!(!output.contains("footer"));
        assert!(!output.contains("---"));
    }

    #[tokio::test]
    async fn test_no_results_marker() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/html/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("<html><body>No results.</body></html>")
            .create_async()
            .await;

        let tool = WebSearchTool::new(
            DuckDuckGoClient::new().with_base_url(format!("{}/html/", server.url())),
            PageFetcher::new(),
        );
        assert_eq!(tool.call("zzzz").await.unwrap(), NO_RESULTS);
    }

    #[tokio::test]
    async fn test_no_readable_articles_marker() {
        let mut server = mockito::Server::new_async().await;
        let empty = format!("{}/empty", server.url());
        server
            .mock("GET", "/html/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(results_page(&[&empty]))
            .create_async()
            .await;
        server
            .mock("GET", "/empty")
            .with_status(200)
            .with_body("<div>no paragraphs at all</div>")
            .create_async()
            .await;

        let tool = WebSearchTool::new(
            DuckDuckGoClient::new().with_base_url(format!("{}/html/", server.url())),
            PageFetcher::new(),
        );
        assert_eq!(tool.call("q").await.unwrap(), NO_READABLE_ARTICLES);
    }

    #[tokio::test]
    async fn test_search_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/html/")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let tool = WebSearchTool::new(
            DuckDuckGoClient::new().with_base_url(format!("{}/html/", server.url())),
            PageFetcher::new(),
        );
        let err = tool.call("q").await.unwrap_err();
        assert!(matches!(err, AppError::Search(_)));
    }
}

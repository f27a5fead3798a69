use super::Tool;
use crate::embeddings::Retriever;
use crate::types::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub const NO_KNOWLEDGE: &str = "No relevant information found in the knowledge base.";

/// Knowledge-base lookup. Best effort: a missing or failing retriever
/// yields a note telling the agent to carry on without it.
pub struct KnowledgeBaseTool {
    retriever: Option<Arc<dyn Retriever>>,
}

impl KnowledgeBaseTool {
    pub fn new(retriever: Option<Arc<dyn Retriever>>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for KnowledgeBaseTool {
    fn name(&self) -> &str {
        "knowledge_base"
    }

    fn description(&self) -> &str {
        "Retrieve relevant context about the company and its content from the knowledge base."
    }

    async fn call(&self, query: &str) -> AppResult<String> {
        let Some(retriever) = &self.retriever else {
            warn!("Knowledge base tool called without a retriever");
            return Ok("The knowledge base is unavailable. Please proceed without it.".to_string());
        };

        info!(query = %query, "Knowledge base tool invoked");

        match retriever.retrieve(query).await {
            Ok(passages) => {
                let context = passages
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");

                if context.trim().is_empty() {
                    warn!("No relevant information found in the knowledge base");
                    return Ok(NO_KNOWLEDGE.to_string());
                }

                info!(count = passages.len(), "Retrieved knowledge base context");
                Ok(context)
            }
            Err(e) => {
                warn!(error = %e, "Knowledge base retrieval failed");
                Ok(format!(
                    "Error retrieving context from knowledge base: {}. Please proceed without.",
                    e
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{Passage, RetrievalError};

    struct FixedRetriever(Result<Vec<Passage>, String>);

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<Passage>, RetrievalError> {
            self.0.clone().map_err(RetrievalError::Index)
        }
    }

    fn passage(text: &str) -> Passage {
        Passage {
            id: text.to_string(),
            text: text.to_string(),
            score: 1.0,
        }
    }

    #[tokio::test]
    async fn test_joins_passages() {
        let tool = KnowledgeBaseTool::new(Some(Arc::new(FixedRetriever(Ok(vec![
            passage("one"),
            passage("two"),
        ])))));
        assert_eq!(tool.call("q").await.unwrap(), "one\n\ntwo");
    }

    #[tokio::test]
    async fn test_failure_is_not_fatal() {
        let tool = KnowledgeBaseTool::new(Some(Arc::new(FixedRetriever(Err("down".to_string())))));
        let output = tool.call("q").await.unwrap();
        assert!(output.contains("Please proceed without"));
    }

    #[tokio::test]
    async fn test_empty_and_missing() {
        let empty = KnowledgeBaseTool::new(Some(Arc::new(FixedRetriever(Ok(vec![])))));
        assert_eq!(empty.call("q").await.unwrap(), NO_KNOWLEDGE);

        let missing = KnowledgeBaseTool::new(None);
        tokio_test::assert_ok!(missing.call("q").await);
    }
}

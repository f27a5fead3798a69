//! Chat Responder
//!
//! Single-turn support chat grounded on the knowledge base.

use crate::embeddings::Retriever;
use crate::llm::LLM;
use crate::types::AppResult;
use std::sync::Arc;
use tracing::{info, warn};

pub struct ChatResponder {
    llm: LLM,
    retriever: Option<Arc<dyn Retriever>>,
    brand: String,
}

impl ChatResponder {
    pub fn new(llm: LLM, retriever: Option<Arc<dyn Retriever>>, brand: impl Into<String>) -> Self {
        Self {
            llm,
            retriever,
            brand: brand.into(),
        }
    }

    /// Newline-joined passage text; empty when retrieval is unavailable or fails
    async fn retrieve_context(&self, query: &str) -> String {
        let Some(retriever) = &self.retriever else {
            warn!("No knowledge retriever configured, answering without context");
            return String::new();
        };

        match retriever.retrieve(query).await {
            Ok(passages) => {
                info!(count = passages.len(), "Retrieved chat context");
                passages
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
                    .trim()
                    .to_string()
            }
            Err(e) => {
                warn!(error = %e, "Retriever failed, answering without context");
                String::new()
            }
        }
    }

    fn create_chat_prompt(&self, user_query: &str, context: &str) -> String {
        format!(r#"You are the official general support AI chatbot for **{brand}**.
{brand} is a company founded by DirectEd scholars after working on a project together, and it focuses on high-quality blog posts and content.

Keep replies brief, realistic and chat-like, like a responsive support assistant.
Do not repeat long intros or greetings in every reply.

If a user's question or input is unclear, either ask for more information or say that you did not understand.

### Knowledge Base (for reference only, do not dump unless asked):
- Focus: high-quality blog posts, insights and content creation.
- Founding: established by DirectEd scholars following a successful project.
- Core process: blog generation is handled by a specialized team of writing agents (internal process).
- General support: this chat handles general questions, company info and navigation.
- Goal: to share knowledge and foster discussion.

### Handling off-topic questions:
- If a question is unrelated to {brand}, answer briefly and politely remind the user that you mainly help with {brand}, its content and company info.
- Do not remind them after every message. Warn plainly the first time, then more subtly the third time, then again the fifth time, and so on.
- Vary the wording each time so it never reads like a canned message.

### Style:
- Tone: professional, knowledgeable and concise.
- Length: 1-3 short sentences.
- Formatting: simple lists or emojis only if they aid clarity.

Context: {context}
User: {user_query}
Chatbot:"#,
            brand = self.brand,
            context = context,
            user_query = user_query,
        )
    }

    /// Produce a reply to `topic`. The reply may be empty; model errors propagate.
    pub async fn respond(&self, topic: &str) -> AppResult<String> {
        let context = self.retrieve_context(topic).await;
        let prompt = self.create_chat_prompt(topic, &context);

        let response = self
            .llm
            .create_chat_completion(&self.llm.request(prompt))
            .await?;

        info!(response_len = response.content.len(), "Chat reply generated");
        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{Passage, RetrievalError};
    use crate::llm::scripted::ScriptedAdapter;
    use async_trait::async_trait;

    struct FixedRetriever(Result<Vec<&'static str>, &'static str>);

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<Passage>, RetrievalError> {
            match &self.0 {
                Ok(texts) => Ok(texts
                    .iter()
                    .enumerate()
                    .map(|(i, t)| Passage { id: i.to_string(), text: t.to_string(), score: 1.0 })
                    .collect()),
                Err(e) => Err(RetrievalError::Index(e.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_context_is_newline_joined() {
        let adapter = ScriptedAdapter::new(["We write blogs."]);
        let retriever: Arc<dyn Retriever> = Arc::new(FixedRetriever(Ok(vec!["Founded 2024.", "Based online."])));
        let responder = ChatResponder::new(adapter.llm(), Some(retriever), "Mindtype");

        let reply = responder.respond("tell me about you").await.unwrap();
        assert_eq!(reply, "We write blogs.");

        let prompt = &adapter.requests()[0].messages[0].content;
        assert!(prompt.contains("Context: Founded 2024.\nBased online.\n"));
        assert!(prompt.contains("User: tell me about you"));
        assert!(prompt.contains("**Mindtype**"));
    }

    #[tokio::test]
    async fn test_retrieval_failure_uses_empty_context() {
        let adapter = ScriptedAdapter::new(["Hello!"]);
        let retriever: Arc<dyn Retriever> = Arc::new(FixedRetriever(Err("index offline")));
        let responder = ChatResponder::new(adapter.llm(), Some(retriever), "Mindtype");

        assert_eq!(responder.respond("hi").await.unwrap(), "Hello!");
        let prompt = &adapter.requests()[0].messages[0].content;
        assert!(prompt.contains("Context: \nUser: hi"));
    }

    #[tokio::test]
    async fn test_zero_passages_still_answers() {
        let adapter = ScriptedAdapter::new(["We mostly write about tech."]);
        let retriever: Arc<dyn Retriever> = Arc::new(FixedRetriever(Ok(vec![])));
        let responder = ChatResponder::new(adapter.llm(), Some(retriever), "Mindtype");

        let reply = responder.respond("what do you write about?").await.unwrap();
        assert_eq!(reply, "We mostly write about tech.");
        let prompt = &adapter.requests()[0].messages[0].content;
        assert!(prompt.contains("Context: \nUser: what do you write about?"));
    }

    #[tokio::test]
    async fn test_no_retriever_and_empty_reply() {
        let adapter = ScriptedAdapter::new([""]);
        let responder = ChatResponder::new(adapter.llm(), None, "Mindtype");
        assert_eq!(responder.respond("hi").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let adapter = ScriptedAdapter::new(Vec::<String>::new());
        adapter.push_err("rate limited");
        let responder = ChatResponder::new(adapter.llm(), None, "Mindtype");
        tokio_test::assert_err!(responder.respond("hi").await);
    }
}

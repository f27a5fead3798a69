use crate::llm::provider::LLMAdapter;
use crate::types::{AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;
use std::time::Duration;

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Groq serves the router and the support chat; it speaks the OpenAI wire format
pub struct GroqAdapter {
    inner: crate::llm::openai::OpenAIAdapter,
}

impl GroqAdapter {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        Self {
            inner: crate::llm::openai::OpenAIAdapter::with_timeout(api_key, GROQ_API_BASE, timeout),
        }
    }
}

#[async_trait]
impl LLMAdapter for GroqAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.inner.create_chat_completion(request).await
    }
}

// Google Gemini adapter
// Uses Gemini's OpenAI-compatible endpoint, so requests go through OpenAIAdapter.
// Docs: https://ai.google.dev/gemini-api/docs/openai

use crate::llm::provider::LLMAdapter;
use crate::types::{AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;
use std::time::Duration;

const GEMINI_OPENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

pub struct GoogleAdapter {
    inner: crate::llm::openai::OpenAIAdapter,
}

impl GoogleAdapter {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        Self {
            inner: crate::llm::openai::OpenAIAdapter::with_timeout(
                api_key,
                GEMINI_OPENAI_API_BASE,
                timeout,
            ),
        }
    }

    /// Gemini model ids are sometimes written with a provider prefix
    /// (`gemini/gemini-2.5-pro`); the endpoint wants the bare id.
    fn bare_model(model: &str) -> &str {
        model.strip_prefix("gemini/").unwrap_or(model)
    }
}

#[async_trait]
impl LLMAdapter for GoogleAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let model = Self::bare_model(&request.model);
        if model == request.model {
            return self.inner.create_chat_completion(request).await;
        }

        let mut request = request.clone();
        request.model = model.to_string();
        self.inner.create_chat_completion(&request).await
    }
}

pub mod models {
    pub const GEMINI_2_5_PRO: &str = "gemini-2.5-pro";
    pub const DEFAULT_GENERATION: &str = GEMINI_2_5_PRO;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_model_strips_prefix() {
        assert_eq!(GoogleAdapter::bare_model("gemini/gemini-2.5-pro"), "gemini-2.5-pro");
        assert_eq!(GoogleAdapter::bare_model("gemini-2.5-flash"), "gemini-2.5-flash");
    }

    #[test]
    fn test_default_generation_model() {
        assert_eq!(models::DEFAULT_GENERATION, "gemini-2.5-pro");
    }
}

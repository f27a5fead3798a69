use async_trait::async_trait;
use crate::types::{LLMProvider, LLMRequest, LLMResponse, AppResult};
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

pub struct LLMProviderConfig {
    pub provider: LLMProvider,
    pub api_key: String,
    pub timeout: Duration,
}

/// A provider-bound client plus the model parameters its callers use.
///
/// Cheap to clone; the adapter is shared.
#[derive(Clone)]
pub struct LLM {
    adapter: Arc<dyn LLMAdapter>,
    provider_name: String,
    model: String,
    temperature: f32,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig, model: impl Into<String>, temperature: f32) -> Self {
        let adapter: Arc<dyn LLMAdapter> = match provider.provider {
            LLMProvider::Groq => Arc::new(crate::llm::groq::GroqAdapter::new(
                &provider.api_key,
                provider.timeout,
            )),
            LLMProvider::Google => Arc::new(crate::llm::google::GoogleAdapter::new(
                &provider.api_key,
                provider.timeout,
            )),
        };

        Self {
            adapter,
            provider_name: provider.provider.to_string(),
            model: model.into(),
            temperature,
        }
    }

    /// Wrap an existing adapter (used for alternative backends and in tests)
    pub fn from_adapter(
        provider_name: impl Into<String>,
        adapter: Arc<dyn LLMAdapter>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            adapter,
            provider_name: provider_name.into(),
            model: model.into(),
            temperature,
        }
    }

    /// Same adapter, different sampling temperature
    pub fn with_temperature(&self, temperature: f32) -> Self {
        Self {
            temperature,
            ..self.clone()
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a single-turn request against this client's model and temperature
    pub fn request(&self, prompt: impl Into<String>) -> LLMRequest {
        LLMRequest::single_turn(self.model.clone(), prompt).with_temperature(self.temperature)
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}

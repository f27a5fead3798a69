// Cohere embedding client (query side only; the index is populated elsewhere)

use super::RetrievalError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const COHERE_API_BASE: &str = "https://api.cohere.com/v1";
const EMBED_MODEL: &str = "embed-english-v3.0";

pub struct CohereEmbedder {
    client: Client,
    api_key: String,
    api_base: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: [&'a str; 1],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl CohereEmbedder {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.to_string(),
            api_base: COHERE_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Embed a search query
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let body = EmbedRequest {
            texts: [text],
            model: EMBED_MODEL,
            input_type: "search_query",
        };

        let response = self
            .client
            .post(format!("{}/embed", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Embedding(format!("Cohere returned {}: {}", status, error_text)));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Embedding(format!("Failed to parse embed response: {}", e)))?;

        parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Embedding("Cohere returned no embeddings".to_string()))
    }
}

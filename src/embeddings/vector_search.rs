// Vector search over a managed Pinecone index

use super::{CohereEmbedder, RetrievalError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const PINECONE_CONTROL_PLANE: &str = "https://api.pinecone.io";
const PINECONE_API_VERSION: &str = "2024-07";
/// Metadata key the ingestion side stores chunk text under
const TEXT_METADATA_KEY: &str = "text";

pub const DEFAULT_TOP_K: usize = 4;

/// One retrieved passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub text: String,
    pub score: f32,
}

/// `query(text) -> ordered passages`, best match first
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError>;
}

#[cfg_attr(test, derive(Debug))]
pub struct PineconeIndex {
    client: Client,
    api_key: String,
    host: String,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl PineconeIndex {
    fn build_client(timeout: Duration) -> Client {
        Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new())
    }

    /// Use a known data-plane host (`https://<index>-<project>.svc.<env>.pinecone.io`)
    pub fn with_host(api_key: &str, host: &str, timeout: Duration) -> Self {
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };

        Self {
            client: Self::build_client(timeout),
            api_key: api_key.to_string(),
            host,
        }
    }

    /// Resolve the data-plane host of an existing index through the control plane
    pub async fn connect(api_key: &str, index_name: &str, timeout: Duration) -> Result<Self, RetrievalError> {
        Self::connect_via(PINECONE_CONTROL_PLANE, api_key, index_name, timeout).await
    }

    pub(crate) async fn connect_via(
        control_plane: &str,
        api_key: &str,
        index_name: &str,
        timeout: Duration,
    ) -> Result<Self, RetrievalError> {
        let client = Self::build_client(timeout);
        let response = client
            .get(format!("{}/indexes/{}", control_plane, index_name))
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
            .send()
            .await
            .map_err(|e| RetrievalError::Index(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Index(format!(
                "Describing index '{}' returned {}",
                index_name, status
            )));
        }

        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Index(format!("Failed to parse index description: {}", e)))?;

        info!(index = %index_name, host = %described.host, "Connected to existing Pinecone index");
        Ok(Self::with_host(api_key, &described.host, timeout))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let body = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Index(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Index(format!("Query returned {}: {}", status, error_text)));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Index(format!("Failed to parse query response: {}", e)))?;

        // Matches without stored text carry nothing to ground a reply on
        let passages = parsed
            .matches
            .into_iter()
            .filter_map(|m| {
                let text = m
                    .metadata
                    .as_ref()
                    .and_then(|meta| meta.get(TEXT_METADATA_KEY))
                    .and_then(|v| v.as_str())?
                    .to_string();
                Some(Passage {
                    id: m.id,
                    text,
                    score: m.score,
                })
            })
            .collect();

        Ok(passages)
    }
}

/// Embeds the query with Cohere, then asks Pinecone for the nearest passages
pub struct KnowledgeRetriever {
    embedder: CohereEmbedder,
    index: PineconeIndex,
    top_k: usize,
}

impl KnowledgeRetriever {
    pub fn new(embedder: CohereEmbedder, index: PineconeIndex, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }
}

#[async_trait]
impl Retriever for KnowledgeRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        let vector = self.embedder.embed_query(query).await?;
        let passages = self.index.query(&vector, self.top_k).await?;
        debug!(count = passages.len(), top_k = self.top_k, "Retrieved passages");
        Ok(passages)
    }
}

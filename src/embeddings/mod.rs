// Embeddings and vector search
//
// Query-side only: the Pinecone index is provisioned and populated outside
// this service.

pub mod cohere;
pub mod vector_search;

pub use cohere::CohereEmbedder;
pub use vector_search::{KnowledgeRetriever, Passage, PineconeIndex, Retriever, DEFAULT_TOP_K};

use std::time::Duration;

/// Timeout for embedding and vector index requests
pub const RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Embedding request failed: {0}")]
    Embedding(String),

    #[error("Vector index request failed: {0}")]
    Index(String),
}

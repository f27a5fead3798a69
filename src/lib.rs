// Blogsmith - routes requests between a multi-agent blog writer and a RAG support chat

pub mod config;
pub mod models;
pub mod types;
pub mod agents;
pub mod llm;
pub mod search;    // DuckDuckGo search and article extraction
pub mod embeddings;
pub mod tools;
pub mod routes;
pub mod middleware;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

use agents::{BlogPipeline, ChatResponder, PipelineDefinition, QueryRouter};
use embeddings::{CohereEmbedder, KnowledgeRetriever, PineconeIndex, Retriever, RETRIEVAL_TIMEOUT};
use llm::{LLMProviderConfig, LLM};
use search::{DuckDuckGoClient, PageFetcher};
use std::sync::Arc;
use tools::{KnowledgeBaseTool, ToolRegistry, WebSearchTool};
use tracing::{info, warn};
use types::LLMProvider;

pub fn create_router(
    state: AppState,
    config: &Config,
) -> Result<axum::Router, axum::http::header::InvalidHeaderValue> {
    routes::create_router(state, &config.server)
}

/// Connect the knowledge retriever. Startup continues without one when the
/// index cannot be reached; chat then answers without context.
pub async fn connect_retriever(config: &Config) -> Option<Arc<dyn Retriever>> {
    let retrieval = &config.retrieval;

    let index = match &retrieval.pinecone_index_host {
        Some(host) => PineconeIndex::with_host(&retrieval.pinecone_api_key, host, RETRIEVAL_TIMEOUT),
        None => match PineconeIndex::connect(&retrieval.pinecone_api_key, &retrieval.pinecone_index, RETRIEVAL_TIMEOUT).await {
            Ok(index) => index,
            Err(e) => {
                warn!(index = %retrieval.pinecone_index, error = %e, "Knowledge retriever unavailable");
                return None;
            }
        },
    };

    let embedder = CohereEmbedder::new(&retrieval.cohere_api_key, RETRIEVAL_TIMEOUT);
    info!(host = %index.host(), top_k = retrieval.top_k, "Knowledge retriever ready");
    let retriever: Arc<dyn Retriever> = Arc::new(KnowledgeRetriever::new(embedder, index, retrieval.top_k));
    Some(retriever)
}

/// Build every shared component once
pub async fn build_state(config: &Config) -> AppState {
    let generation_llm = LLM::new(
        LLMProviderConfig {
            provider: LLMProvider::Google,
            api_key: config.llm.google_api_key.clone(),
            timeout: config.llm.timeout,
        },
        config.llm.generation_model.clone(),
        config.llm.generation_temperature,
    );
    let chat_llm = LLM::new(
        LLMProviderConfig {
            provider: LLMProvider::Groq,
            api_key: config.llm.groq_api_key.clone(),
            timeout: config.llm.timeout,
        },
        config.llm.chat_model.clone(),
        config.llm.chat_temperature,
    );
    let router_llm = chat_llm.with_temperature(0.0);

    let retriever = connect_retriever(config).await;

    let tools = ToolRegistry::new()
        .register(Arc::new(WebSearchTool::new(DuckDuckGoClient::new(), PageFetcher::new())))
        .register(Arc::new(KnowledgeBaseTool::new(retriever.clone())));

    let definition = PipelineDefinition::load(&config.pipeline.config_dir);
    if definition.is_empty() {
        warn!(dir = %config.pipeline.config_dir.display(), "No agent definitions loaded, pipeline will run with empty prompts");
    }

    info!(
        generation = %format!("{}/{}", generation_llm.provider_name(), generation_llm.model()),
        chat = %format!("{}/{}", chat_llm.provider_name(), chat_llm.model()),
        tools = tools.len(),
        "Application state built"
    );

    AppState {
        router: Arc::new(QueryRouter::new(router_llm)),
        pipeline: Arc::new(BlogPipeline::new(&definition, generation_llm, &tools)),
        chat: Arc::new(ChatResponder::new(chat_llm, retriever, config.chat.brand_name.clone())),
    }
}

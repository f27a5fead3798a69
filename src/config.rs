use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be set ({purpose})")]
    Missing {
        name: &'static str,
        purpose: &'static str,
    },

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub retrieval: RetrievalConfig,
    pub pipeline: PipelineConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origin: String,
    pub rate_limit_per_minute: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub google_api_key: String,
    pub groq_api_key: String,
    pub chat_model: String,
    pub generation_model: String,
    pub generation_temperature: f32,
    pub chat_temperature: f32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub cohere_api_key: String,
    pub pinecone_api_key: String,
    pub pinecone_index: String,
    pub pinecone_index_host: Option<String>,
    pub top_k: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub config_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub brand_name: String,
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str, purpose: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing { name, purpose })
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }
}

impl Config {
    /// Load from the process environment, after reading `.env` if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Required secrets are checked
    /// first so a missing one is reported before any parse error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let google_api_key = env.required("GOOGLE_API_KEY", "API key for the blog generation model")?;
        let groq_api_key = env.required("GROQ_API_KEY", "API key for the chat and routing model")?;
        let chat_model = env.required("GROQ_MODEL", "model id for the chat and routing model")?;
        let cohere_api_key = env.required("COHERE_API_KEY", "API key for the embedding model")?;
        let pinecone_api_key = env.required("PINECONE_API_KEY", "API key for the vector index")?;
        let pinecone_index = env.required("PINECONE_INDEX", "name of the vector index")?;

        Ok(Self {
            server: ServerConfig {
                host: env.or("HOST", "0.0.0.0"),
                port: env.parsed("PORT", 8000)?,
                allowed_origin: env.or("ALLOWED_ORIGIN", "https://mindtypex.netlify.app"),
                rate_limit_per_minute: env.parsed("RATE_LIMIT_PER_MINUTE", NonZeroU32::new(5).unwrap_or(NonZeroU32::MIN))?,
            },
            llm: LLMConfig {
                google_api_key,
                groq_api_key,
                chat_model,
                generation_model: env.or("GENERATION_MODEL", crate::llm::google::models::DEFAULT_GENERATION),
                generation_temperature: env.parsed("GENERATION_TEMPERATURE", 0.5)?,
                chat_temperature: env.parsed("CHAT_TEMPERATURE", 0.7)?,
                timeout: Duration::from_secs(env.parsed("LLM_TIMEOUT_SECS", 120)?),
            },
            retrieval: RetrievalConfig {
                cohere_api_key,
                pinecone_api_key,
                pinecone_index,
                pinecone_index_host: env.get("PINECONE_INDEX_HOST"),
                top_k: env.parsed("RETRIEVER_TOP_K", crate::embeddings::DEFAULT_TOP_K)?,
            },
            pipeline: PipelineConfig {
                config_dir: PathBuf::from(env.or("AGENTS_CONFIG_DIR", "config")),
            },
            chat: ChatConfig {
                brand_name: env.or("CHAT_BRAND_NAME", "Mindtype"),
            },
        })
    }
}

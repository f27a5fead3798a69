use crate::agents::{BlogPipeline, ChatResponder, PipelineError, QueryRouter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Shared, read-only request-handling components, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<QueryRouter>,
    pub pipeline: Arc<BlogPipeline>,
    pub chat: Arc<ChatResponder>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Casual,
    #[default]
    Informative,
    Engaging,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Informative => "informative",
            Tone::Engaging => "engaging",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BlogRequest {
    #[validate(length(min = 1, max = 500, message = "topic must be between 1 and 500 characters"))]
    pub topic: String,
    #[serde(default)]
    pub tone: Tone,
}

/// Which downstream path handles a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Multi-agent blog generation pipeline
    Generate,
    /// Retrieval-augmented support chat
    Chat,
}

impl RouteDecision {
    /// Token the routing model is asked to answer with
    pub fn token(&self) -> &'static str {
        match self {
            RouteDecision::Generate => "crewai",
            RouteDecision::Chat => "langchain",
        }
    }

    /// Interpret a routing model reply. Surrounding whitespace, quotes,
    /// backticks and trailing punctuation are ignored; anything else that
    /// is not exactly one of the two tokens is rejected.
    pub fn from_model_reply(reply: &str) -> Option<Self> {
        let cleaned = reply
            .trim()
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '.' | '!' | '*'))
            .to_lowercase();

        match cleaned.as_str() {
            "crewai" => Some(RouteDecision::Generate),
            "langchain" => Some(RouteDecision::Chat),
            _ => None,
        }
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

fn untitled() -> String {
    "Untitled".to_string()
}

/// Structured output the summarizing stage must emit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogOutput {
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default)]
    pub blog_post: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub blog_preview: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogResponse {
    pub status: ResponseStatus,
    pub title: String,
    pub content: String,
    pub meta_description: String,
    pub blog_preview: String,
}

impl BlogResponse {
    pub fn success(output: BlogOutput) -> Self {
        Self {
            status: ResponseStatus::Success,
            title: output.title,
            content: output.blog_post,
            meta_description: output.meta_description,
            blog_preview: output.blog_preview,
        }
    }

    fn error(content: &str, meta_description: &str) -> Self {
        Self {
            status: ResponseStatus::Error,
            title: "Blog Generation Failed".to_string(),
            content: content.to_string(),
            meta_description: meta_description.to_string(),
            blog_preview: String::new(),
        }
    }

    /// Catch-all for faults outside the pipeline's own failure modes
    pub fn unexpected_error() -> Self {
        Self::error(
            "Blog generation failed due to an unexpected error. Please try again later.",
            "Error in processing the request.",
        )
    }

    pub fn from_pipeline_error(error: &PipelineError) -> Self {
        match error {
            PipelineError::InvalidStructure { .. } => Self::error(
                "Blog output was not valid JSON. Check agent prompts.",
                "Invalid JSON structure.",
            ),
            PipelineError::Parse { .. } => Self::error(
                "Failed to parse final output as JSON. Check agent output structure.",
                "JSON decoding failed.",
            ),
            PipelineError::Stage { .. } => Self::error(
                "Blog generation failed. An internal pipeline error occurred.",
                "Pipeline execution error.",
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatResponse {
    pub const APOLOGY: &'static str = "Sorry, I couldn't generate a response.";

    /// Wrap a reply, substituting the apology for a blank one
    pub fn from_reply(reply: String) -> Self {
        if reply.trim().is_empty() {
            Self {
                response: Self::APOLOGY.to_string(),
            }
        } else {
            Self { response: reply }
        }
    }
}

/// The two shapes `POST /chat` can answer with; clients tell them apart by
/// the presence of `status` (blog) or `response` (chat).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Blog(BlogResponse),
    Chat(ChatResponse),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

//! Query Router
//!
//! Decides whether a request goes to the blog pipeline or the support chat.
//! Explicit "write me a blog post" phrasing is recognised locally; everything
//! else is classified by a fast model. When in doubt, or when the model call
//! fails, the request goes to chat: it is the cheaper path and nothing it
//! does needs undoing.

use crate::llm::LLM;
use crate::models::RouteDecision;
use tracing::{info, warn};

/// Imperative phrases that leave no doubt the user wants new content written
const GENERATION_INDICATORS: &[&str] = &[
    "write a blog", "write me a blog", "write a post", "write me a post",
    "write an article", "write me an article", "generate a blog", "generate a post",
    "generate me a blog", "generate an article", "create a blog", "create a post",
    "create an article", "draft a blog", "draft a post", "draft an article",
    "compose a blog", "compose a post",
];

/// Openers that make the topic a question about content rather than a request for it
const QUESTION_OPENERS: &[&str] = &[
    "do", "does", "did", "is", "are", "was", "were", "have", "has",
    "what", "which", "who", "where", "when", "why", "how",
];

pub struct QueryRouter {
    llm: LLM,
}

impl QueryRouter {
    pub fn new(llm: LLM) -> Self {
        Self { llm }
    }

    /// Deterministic check for unambiguous generation requests. Questions
    /// never qualify; the routing model decides those.
    pub fn is_explicit_generation_request(topic: &str) -> bool {
        let topic_lower = topic
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let is_question = topic_lower.ends_with('?')
            || topic_lower
                .split(|c: char| !c.is_alphanumeric())
                .next()
                .is_some_and(|first| QUESTION_OPENERS.contains(&first));
        if is_question {
            return false;
        }

        GENERATION_INDICATORS
            .iter()
            .any(|indicator| topic_lower.contains(indicator))
    }

    fn create_router_prompt(query: &str) -> String {
        format!(r#"You are a routing expert. Decide whether to route the user query to
'crewai' (for content generation) or 'langchain' (for general chat).
Before making the decision, thoroughly analyze the user's input.
- If they directly ask for a blog post or other new content to be generated, in whatever way, the route is crewai.
- If the user's input is unclear, the route is langchain.
- General queries, for example what the company does or what type of content it publishes, are langchain.
Respond with one word only: crewai or langchain.

User: "{query}"
Response:"#,
            query = query,
        )
    }

    /// Classify `topic`. Never fails: model errors and unrecognised replies
    /// resolve to [`RouteDecision::Chat`].
    pub async fn classify(&self, topic: &str) -> RouteDecision {
        if Self::is_explicit_generation_request(topic) {
            info!(decision = %RouteDecision::Generate, "Explicit generation request, skipping router model");
            return RouteDecision::Generate;
        }

        let request = self
            .llm
            .request(Self::create_router_prompt(topic))
            .with_max_tokens(8);

        let decision = match self.llm.create_chat_completion(&request).await {
            Ok(response) => RouteDecision::from_model_reply(&response.content).unwrap_or_else(|| {
                warn!(reply = %response.content, "Router returned an unrecognised decision, proceeding with chat");
                RouteDecision::Chat
            }),
            Err(e) => {
                warn!(error = %e, "Router LLM failed, proceeding with chat");
                RouteDecision::Chat
            }
        };

        info!(decision = %decision, "Routed query");
        decision
    }
}

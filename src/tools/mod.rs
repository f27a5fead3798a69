//! Tool Layer
//!
//! Named capabilities an agent can call while working on a task:
//!
//! - `web_search` - search the web and pull readable article text
//! - `knowledge_base` - look the query up in the company knowledge base

pub mod knowledge_base;
pub mod web_search;

pub use knowledge_base::KnowledgeBaseTool;
pub use web_search::WebSearchTool;

use crate::types::AppResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used to reference the tool from agent configuration
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run the tool. `Ok` output is handed to the model verbatim, so
    /// recoverable conditions come back as explanatory text.
    async fn call(&self, query: &str) -> AppResult<String>;
}

/// Tools available to agents, looked up by name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::stub::StubTool;
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = ToolRegistry::new()
            .register(StubTool::ok("web_search", "a"))
            .register(StubTool::ok("knowledge_base", "b"));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("web_search").is_some());
        assert!(registry.get("calculator").is_none());
    }
}

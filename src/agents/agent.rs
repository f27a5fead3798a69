//! A role-configured agent that carries out one task per pipeline stage.

use crate::agents::definition::{AgentProfile, TaskSpec};
use crate::llm::LLM;
use crate::models::Tone;
use crate::tools::{Tool, ToolRegistry};
use crate::types::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-run values interpolated into task descriptions
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInputs {
    pub topic: String,
    pub tone: Tone,
}

impl TaskInputs {
    pub fn new(topic: impl Into<String>, tone: Tone) -> Self {
        Self {
            topic: topic.into(),
            tone,
        }
    }

    /// Fill `{topic}` and `{tone}` in one pass; substituted text is never rescanned
    pub fn interpolate(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + self.topic.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];

            if let Some(after) = tail.strip_prefix("{topic}") {
                out.push_str(&self.topic);
                rest = after;
            } else if let Some(after) = tail.strip_prefix("{tone}") {
                out.push_str(self.tone.as_str());
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }

        out.push_str(rest);
        out
    }
}

pub struct Agent {
    profile: AgentProfile,
    llm: LLM,
    tools: Vec<Arc<dyn Tool>>,
}

impl Agent {
    /// Build an agent, resolving its configured tool names against `registry`.
    /// Unknown names are logged and skipped.
    pub fn new(profile: AgentProfile, llm: LLM, registry: &ToolRegistry) -> Self {
        let tools = profile
            .tools
            .iter()
            .filter_map(|name| {
                let tool = registry.get(name);
                if tool.is_none() {
                    warn!(role = %profile.role, tool = %name, "Unknown tool in agent config, skipping");
                }
                tool
            })
            .collect();

        let agent = Self {
            profile,
            llm,
            tools,
        };
        debug!(role = %agent.profile.role, tools = ?agent.tool_names(), "Agent ready");
        agent
    }

    pub fn role(&self) -> &str {
        &self.profile.role
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    fn system_prompt(&self) -> String {
        let mut prompt = String::new();
        if !self.profile.role.is_empty() {
            prompt.push_str(&format!("You are {}.", self.profile.role.trim()));
        }
        if !self.profile.backstory.is_empty() {
            prompt.push_str(&format!(" {}", self.profile.backstory.trim()));
        }
        if !self.profile.goal.is_empty() {
            prompt.push_str(&format!("\nYour personal goal is: {}", self.profile.goal.trim()));
        }
        prompt.trim().to_string()
    }

    /// Call every tool this agent owns with the run topic.
    /// A tool error aborts the task.
    async fn gather_tool_output(&self, inputs: &TaskInputs) -> AppResult<Vec<(Arc<dyn Tool>, String)>> {
        let mut outputs = Vec::with_capacity(self.tools.len());
        for tool in &self.tools {
            info!(role = %self.profile.role, tool = tool.name(), "Using tool");
            let output = tool.call(&inputs.topic).await?;
            outputs.push((tool.clone(), output));
        }
        Ok(outputs)
    }

    fn task_prompt(
        &self,
        task: &TaskSpec,
        inputs: &TaskInputs,
        context: Option<&str>,
        tool_output: &[(Arc<dyn Tool>, String)],
        output_schema: Option<&str>,
    ) -> String {
        let mut prompt = format!("Current Task: {}\n", inputs.interpolate(&task.description).trim());

        if !task.expected_output.is_empty() {
            prompt.push_str(&format!(
                "\nThis is the expected criteria for your final answer: {}\n",
                inputs.interpolate(&task.expected_output).trim()
            ));
        }
        prompt.push_str("You MUST return the actual complete content as the final answer, not a summary.\n");

        if let Some(schema) = output_schema {
            prompt.push_str(&format!(
                "\nYour final answer MUST be a single JSON object matching this schema, with no other text:\n{}\n",
                schema
            ));
        }

        if let Some(context) = context {
            prompt.push_str(&format!(
                "\nThis is the context you're working with:\n{}\n",
                context.trim()
            ));
        }

        for (tool, output) in tool_output {
            prompt.push_str(&format!(
                "\nResult of the `{}` tool ({}) for \"{}\":\n{}\n",
                tool.name(),
                tool.description(),
                inputs.topic,
                output.trim()
            ));
        }

        prompt.push_str("\nBegin! This is VERY important to you, use the information above and give your best Final Answer.");
        prompt
    }

    /// Run `task` and return the model's final answer
    pub async fn execute(
        &self,
        task: &TaskSpec,
        inputs: &TaskInputs,
        context: Option<&str>,
        output_schema: Option<&str>,
    ) -> AppResult<String> {
        let tool_output = self.gather_tool_output(inputs).await?;
        let prompt = self.task_prompt(task, inputs, context, &tool_output, output_schema);
        debug!(role = %self.profile.role, prompt_len = prompt.len(), "Executing task");

        let mut request = self.llm.request(prompt);
        let system = self.system_prompt();
        if !system.is_empty() {
            request = request.with_system(system);
        }

        let response = self.llm.create_chat_completion(&request).await?;
        if response.content.trim().is_empty() {
            return Err(AppError::LLMApi(format!(
                "Agent '{}' returned an empty answer",
                self.profile.role
            )));
        }

        info!(role = %self.profile.role, answer_len = response.content.len(), "Task complete");
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::ScriptedAdapter;
    use crate::tools::stub::StubTool;

    fn profile(tools: &[&str]) -> AgentProfile {
        AgentProfile {
            role: "Senior Researcher".to_string(),
            goal: "Uncover facts".to_string(),
            backstory: "You dig deep.".to_string(),
            tools: tools.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_interpolate() {
        let inputs = TaskInputs::new("Rust", Tone::Casual);
        assert_eq!(inputs.interpolate("Write about {topic} in a {tone} tone"), "Write about Rust in a casual tone");
    }

    #[test]
    fn test_interpolate_does_not_rescan_the_topic() {
        let inputs = TaskInputs::new("templating with {tone} and {topic}", Tone::Engaging);
        assert_eq!(
            inputs.interpolate("Write about {topic} in a {tone} tone"),
            "Write about templating with {tone} and {topic} in a engaging tone"
        );
        assert_eq!(inputs.interpolate("{json: {topic}} {"), "{json: templating with {tone} and {topic}} {");
    }

    #[test]
    fn test_unknown_tools_are_skipped() {
        let registry = ToolRegistry::new().register(StubTool::ok("web_search", "x"));
        let adapter = ScriptedAdapter::new(Vec::<String>::new());
        let agent = Agent::new(profile(&["web_search", "telepathy"]), adapter.llm(), &registry);
        assert_eq!(agent.tool_names(), vec!["web_search"]);
    }

    #[tokio::test]
    async fn test_execute_includes_tools_context_and_schema() {
        let search = StubTool::ok("web_search", "Article text");
        let registry = ToolRegistry::new().register(search.clone());
        let adapter = ScriptedAdapter::new(["final answer"]);
        let agent = Agent::new(profile(&["web_search"]), adapter.llm(), &registry);

        let task = TaskSpec {
            description: "Research {topic}".to_string(),
            expected_output: "A {tone} brief".to_string(),
        };
        let inputs = TaskInputs::new("solar power", Tone::Professional);

        let answer = agent
            .execute(&task, &inputs, Some("previous notes"), Some("{\"title\": \"string\"}"))
            .await
            .unwrap();
        assert_eq!(answer, "final answer");
        assert_eq!(search.queries.lock().unwrap().as_slice(), ["solar power"]);

        let request = &adapter.requests()[0];
        let system = request.system_instruction.as_deref().unwrap();
        assert!(system.starts_with("You are Senior Researcher."));
        assert!(system.contains("Your personal goal is: Uncover facts"));

        let prompt = &request.messages[0].content;
        assert!(prompt.contains("Current Task: Research solar power"));
        assert!(prompt.contains("A professional brief"));
        assert!(prompt.contains("previous notes"));
        assert!(prompt.contains("Result of the `web_search` tool (stub) for \"solar power\":\nArticle text"));
        assert!(prompt.contains("{\"title\": \"string\"}"));
    }

    #[tokio::test]
    async fn test_tool_error_fails_task_without_model_call() {
        let registry = ToolRegistry::new().register(StubTool::failing("web_search", "network down"));
        let adapter = ScriptedAdapter::new(["unused"]);
        let agent = Agent::new(profile(&["web_search"]), adapter.llm(), &registry);

        let result = agent
            .execute(&TaskSpec::default(), &TaskInputs::new("t", Tone::default()), None, None)
            .await;
        tokio_test::assert_err!(result);
        assert_eq!(adapter.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_answer_is_an_error() {
        let adapter = ScriptedAdapter::new(["   "]);
        let agent = Agent::new(AgentProfile::default(), adapter.llm(), &ToolRegistry::new());

        let result = agent
            .execute(&TaskSpec::default(), &TaskInputs::new("t", Tone::default()), None, None)
            .await;
        assert!(matches!(result, Err(AppError::LLMApi(_))));
        assert!(adapter.requests()[0].system_instruction.is_none());
    }
}

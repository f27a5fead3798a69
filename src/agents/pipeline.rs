//! Blog generation pipeline
//!
//! Three stages run strictly in order; each stage's answer is the next
//! stage's context:
//!
//! ```text
//! topic, tone
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Research   │  → web search + knowledge base → research notes
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Writing   │  → full blog post in the requested tone
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │ Summarizing │  → JSON: title, blog_post, meta_description, blog_preview
//! └─────────────┘
//! ```
//!
//! Any stage error fails the whole run. There are no retries.

use crate::agents::agent::{Agent, TaskInputs};
use crate::agents::definition::{PipelineDefinition, TaskSpec};
use crate::llm::LLM;
use crate::models::{BlogOutput, Tone};
use crate::tools::ToolRegistry;
use crate::types::AppError;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// JSON shape the summarizing agent is told to emit
pub const BLOG_OUTPUT_SCHEMA: &str = r#"{
  "title": "string - the blog post title",
  "blog_post": "string - the complete blog post content",
  "meta_description": "string - SEO meta description",
  "blog_preview": "string - brief preview of the blog post"
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Research,
    Writing,
    Summarizing,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::Research => write!(f, "research"),
            StageKind::Writing => write!(f, "writing"),
            StageKind::Summarizing => write!(f, "summarizing"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: StageKind,
        #[source]
        source: AppError,
    },

    #[error("final output is not a JSON object")]
    InvalidStructure { payload: String },

    #[error("final output could not be parsed as JSON: {source}")]
    Parse {
        payload: String,
        #[source]
        source: serde_json::Error,
    },
}

struct Stage {
    kind: StageKind,
    agent: Agent,
    task: TaskSpec,
    output_schema: Option<&'static str>,
}

/// Answer produced by one stage
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub stage: StageKind,
    pub text: String,
}

/// Execution context of a single run; dropped when the run finishes
#[derive(Debug)]
pub struct PipelineRun {
    pub id: Uuid,
    pub inputs: TaskInputs,
    pub outputs: Vec<StageOutput>,
}

impl PipelineRun {
    fn new(inputs: TaskInputs) -> Self {
        Self {
            id: Uuid::new_v4(),
            inputs,
            outputs: Vec::with_capacity(3),
        }
    }

    fn last_output(&self) -> Option<&str> {
        self.outputs.last().map(|o| o.text.as_str())
    }
}

pub struct BlogPipeline {
    stages: Vec<Stage>,
}

impl BlogPipeline {
    pub fn new(definition: &PipelineDefinition, llm: LLM, tools: &ToolRegistry) -> Self {
        let agents = &definition.agents;
        let tasks = &definition.tasks;

        let stages = vec![
            Stage {
                kind: StageKind::Research,
                agent: Agent::new(agents.research_agent.clone(), llm.clone(), tools),
                task: tasks.research_task.clone(),
                output_schema: None,
            },
            Stage {
                kind: StageKind::Writing,
                agent: Agent::new(agents.writing_agent.clone(), llm.clone(), tools),
                task: tasks.writing_task.clone(),
                output_schema: None,
            },
            Stage {
                kind: StageKind::Summarizing,
                agent: Agent::new(agents.summarizing_agent.clone(), llm, tools),
                task: tasks.summarizing_task.clone(),
                output_schema: Some(BLOG_OUTPUT_SCHEMA),
            },
        ];

        Self { stages }
    }

    /// Run all stages and return the summarizing stage's raw answer
    pub async fn kickoff(&self, inputs: TaskInputs) -> Result<String, PipelineError> {
        let mut run = PipelineRun::new(inputs);
        info!(run_id = %run.id, topic = %run.inputs.topic, tone = %run.inputs.tone, "Starting blog pipeline");

        for stage in &self.stages {
            info!(run_id = %run.id, stage = %stage.kind, role = %stage.agent.role(), "Stage started");

            let text = stage
                .agent
                .execute(&stage.task, &run.inputs, run.last_output(), stage.output_schema)
                .await
                .map_err(|source| {
                    error!(run_id = %run.id, stage = %stage.kind, error = %source, "Stage failed");
                    PipelineError::Stage {
                        stage: stage.kind,
                        source,
                    }
                })?;

            info!(run_id = %run.id, stage = %stage.kind, output_len = text.len(), "Stage completed");
            run.outputs.push(StageOutput {
                stage: stage.kind,
                text,
            });
        }

        info!(run_id = %run.id, "Blog pipeline completed");
        Ok(run.outputs.pop().map(|o| o.text).unwrap_or_default())
    }

    /// Run the pipeline and validate its final answer against [`BlogOutput`]
    pub async fn run(&self, topic: &str, tone: Tone) -> Result<BlogOutput, PipelineError> {
        let raw = self.kickoff(TaskInputs::new(topic, tone)).await?;
        parse_blog_output(&raw)
    }
}

/// Strip one leading code-fence line and one trailing code-fence line
/// (when present), then trim.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    if !cleaned.starts_with("```") {
        return cleaned;
    }

    match cleaned.split_once('\n') {
        Some((_, rest)) => cleaned = rest,
        // A lone fence line with nothing else carries no payload
        None => return cleaned,
    }

    match cleaned.rsplit_once('\n') {
        Some((body, last)) if last.trim().starts_with("```") => cleaned = body,
        None if cleaned.trim().starts_with("```") => cleaned = "",
        _ => {}
    }

    cleaned.trim()
}

/// Validate and parse the summarizing stage's answer.
///
/// The brace check runs before parsing, so text that is obviously not an
/// object is reported as `InvalidStructure` rather than `Parse`.
pub fn parse_blog_output(raw: &str) -> Result<BlogOutput, PipelineError> {
    let cleaned = strip_code_fence(raw);

    if cleaned.is_empty() || !(cleaned.starts_with('{') && cleaned.ends_with('}')) {
        let preview: String = cleaned.chars().take(50).collect();
        error!(payload = ?preview, "Pipeline output is empty or not a JSON object after cleaning");
        return Err(PipelineError::InvalidStructure {
            payload: cleaned.to_string(),
        });
    }

    serde_json::from_str::<BlogOutput>(cleaned).map_err(|source| {
        error!(payload = ?cleaned, error = %source, "JSON decode error after cleaning");
        PipelineError::Parse {
            payload: cleaned.to_string(),
            source,
        }
    })
}

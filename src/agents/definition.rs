//! Agent and task definitions for the blog pipeline.
//!
//! Loaded once at startup from `agents.yaml` and `tasks.yaml`. A missing or
//! malformed file is logged and replaced by an empty definition so the
//! service can still start.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Role, goal and backstory of one agent, plus the tools it may call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProfile {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub tools: Vec<String>,
}

/// Instructions for one task. `{topic}` and `{tone}` are filled in per run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSpec {
    pub description: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    pub research_agent: AgentProfile,
    pub writing_agent: AgentProfile,
    pub summarizing_agent: AgentProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    pub research_task: TaskSpec,
    pub writing_task: TaskSpec,
    pub summarizing_task: TaskSpec,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineDefinition {
    pub agents: AgentsConfig,
    pub tasks: TasksConfig,
}

impl PipelineDefinition {
    pub fn load(config_dir: &Path) -> Self {
        Self {
            agents: load_or_default(&config_dir.join("agents.yaml")),
            tasks: load_or_default(&config_dir.join("tasks.yaml")),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let loaded = config::Config::builder()
        .add_source(
            config::File::from(path)
                .format(config::FileFormat::Yaml)
                .required(true),
        )
        .build()
        .and_then(|c| c.try_deserialize::<T>());

    match loaded {
        Ok(value) => {
            info!(path = %path.display(), "Configuration file loaded");
            value
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load configuration file, using empty config");
            T::default()
        }
    }
}

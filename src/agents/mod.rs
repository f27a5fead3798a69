//! Agent System
//!
//! Request handling is split between two paths:
//!
//! - **Query Router**: decides which path a request takes
//! - **Blog Pipeline**: research → writing → summarizing agents, producing a
//!   structured blog post
//! - **Chat Responder**: single-turn support reply grounded on the knowledge base
//!
//! ```text
//! User Request
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Router    │  → crewai | langchain
//! └─────────────┘
//!    │        │
//!    ▼        ▼
//! Pipeline   Chat
//! ```

pub mod agent;
pub mod chat;
pub mod definition;
pub mod pipeline;
pub mod router;

pub use agent::{Agent, TaskInputs};
pub use chat::ChatResponder;
pub use definition::{AgentProfile, AgentsConfig, PipelineDefinition, TaskSpec, TasksConfig};
pub use pipeline::{BlogPipeline, PipelineError, StageKind};
pub use router::QueryRouter;

//! # Crewflow
//!
//! A three-stage content pipeline: a Researcher gathers sources with web
//! search and page fetching, a Writer turns the notes into an article and a
//! Reviewer edits it into the final version. Each stage writes one markdown
//! artifact and hands its output to the next.
//!
//! - **Tools**: key-less web search and best-effort page fetching that never fail
//! - **Agents**: personas driving a bounded tool-calling loop over an LLM client
//! - **Pipeline**: strictly sequential stages with typed handoff and lifecycle events
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crewflow::prelude::*;
//!
//! let config = CrewConfig::from_env()?;
//! let result = Crew::new(config).run("LLM observability best practices").await?;
//! println!("{}", result.result);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod agents;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod llm;
pub mod pipeline;
pub mod retry;
pub mod stages;
pub mod tools;
pub mod utils;
pub mod websearch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agents::{Agent, AgentRole};
    pub use crate::config::{CrewConfig, ModelProvider};
    pub use crate::context::{PipelineContext, RunIdentity, StageContext, StageInputs};
    pub use crate::core::{
        ArtifactKind, ArtifactLayout, StageArtifact, StageEvent, StageOutput, StageStatus,
    };
    pub use crate::errors::{ConfigError, CrewflowError, LlmError, ToolError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::llm::{build_llm_client, EchoLlm, LlmClient, ScriptedLlm};
    pub use crate::pipeline::{Crew, PipelineBuilder, PipelineResult, SequentialPipeline};
    pub use crate::stages::{build_stage_descriptors, Stage, StageDescriptor};
    pub use crate::tools::{Tool, ToolDefinition, ToolOutput, ToolRegistry};
    pub use crate::websearch::{Fetcher, SearchProvider, SearchResult, WebSearcher};
    pub use crate::utils::{generate_uuid, iso_timestamp, Timestamp};
}

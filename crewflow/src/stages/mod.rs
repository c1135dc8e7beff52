//! Stages of the content pipeline.
//!
//! A [`Stage`] is one step the sequential pipeline runs. The crew uses
//! [`AgentStage`], which executes a [`StageDescriptor`] with its persona's
//! agent and writes the resulting artifact.

mod agent_stage;
mod descriptor;

pub use agent_stage::AgentStage;
pub use descriptor::{
    build_stage_descriptors, render_template, StageDescriptor, RESEARCH_STAGE, REVIEW_STAGE,
    WRITING_STAGE,
};

use crate::context::StageContext;
use crate::core::StageOutput;
use async_trait::async_trait;
use std::fmt::Debug;

/// One step of a pipeline.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Executes the stage.
    ///
    /// Failures are reported through the returned [`StageOutput`], not by
    /// panicking.
    async fn execute(&self, ctx: &StageContext) -> StageOutput;
}

//! A stage executed by an agent.

use super::{Stage, StageDescriptor};
use crate::agents::Agent;
use crate::context::StageContext;
use crate::core::{StageArtifact, StageEvent, StageOutput};
use crate::utils::elapsed_ms;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, warn};

/// Runs a [`StageDescriptor`] with its agent and writes the artifact.
#[derive(Debug)]
pub struct AgentStage {
    descriptor: StageDescriptor,
    agent: Agent,
}

impl AgentStage {
    /// Binds a descriptor to the agent that executes it.
    #[must_use]
    pub fn new(descriptor: StageDescriptor, agent: Agent) -> Self {
        Self { descriptor, agent }
    }

    /// The descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }
}

#[async_trait]
impl Stage for AgentStage {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    async fn execute(&self, ctx: &StageContext) -> StageOutput {
        let start = Instant::now();
        let prompt = self.descriptor.prompt(ctx.inputs());

        let content = match self.agent.run(&prompt, ctx).await {
            Ok(content) => content,
            Err(e) => {
                warn!(stage = %self.descriptor.name, error = %e, "Agent failed");
                return StageOutput::fail(e.to_string()).with_duration_ms(elapsed_ms(start));
            }
        };

        if ctx.is_cancelled() {
            let reason = ctx
                .pipeline_ctx()
                .cancel_reason()
                .unwrap_or_else(|| format!("cancelled during stage '{}'", self.descriptor.name));
            info!(stage = %self.descriptor.name, reason = %reason, "Run cancelled, answer discarded");
            return StageOutput::cancel(reason).with_duration_ms(elapsed_ms(start));
        }

        let path = &self.descriptor.output_path;
        let artifact = match StageArtifact::write(self.descriptor.artifact, path, &content).await {
            Ok(artifact) => artifact,
            Err(e) => {
                return StageOutput::fail(format!("failed to write {}: {e}", path.display()))
                    .with_duration_ms(elapsed_ms(start));
            }
        };

        info!(
            stage = %self.descriptor.name,
            path = %path.display(),
            bytes = artifact.bytes,
            "Artifact written"
        );
        ctx.try_emit_event(&StageEvent::artifact_written(
            &ctx.run_id(),
            &self.descriptor.name,
            &path.display().to_string(),
            artifact.bytes,
        ));

        StageOutput::ok(content)
            .with_artifact(artifact)
            .with_duration_ms(elapsed_ms(start))
    }
}

//! Strictly sequential pipeline execution.

use crate::context::{PipelineContext, StageContext, StageInputs};
use crate::core::{StageEvent, StageOutput, StageStatus};
use crate::errors::CrewflowError;
use crate::stages::Stage;
use crate::utils::elapsed_ms;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// Outputs of a completed run, in stage order.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// `(stage name, output)` for every stage.
    pub outputs: Vec<(String, StageOutput)>,
    /// Total execution time in milliseconds.
    pub duration_ms: f64,
}

impl PipelineRun {
    /// Looks up a stage's output by name.
    #[must_use]
    pub fn output(&self, stage: &str) -> Option<&StageOutput> {
        self.outputs
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, output)| output)
    }

    /// The last stage's output.
    #[must_use]
    pub fn last(&self) -> Option<&StageOutput> {
        self.outputs.last().map(|(_, output)| output)
    }
}

/// An ordered list of stages run one after the other.
///
/// Each stage receives the previous stage's output. A stage starts only after
/// the previous one succeeded and, if it declared an artifact, the artifact
/// exists on disk. The first failure aborts the run.
#[derive(Debug)]
pub struct SequentialPipeline {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
}

impl SequentialPipeline {
    pub(super) fn new(name: String, stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { name, stages }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|stage| stage.name().to_string()).collect()
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; the builder rejects empty pipelines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage in order.
    ///
    /// # Errors
    ///
    /// [`CrewflowError::Cancelled`] if the context is cancelled before a stage
    /// starts, [`CrewflowError::StageExecution`] for the first stage that
    /// fails or leaves its artifact missing.
    pub async fn execute(&self, ctx: Arc<PipelineContext>) -> Result<PipelineRun, CrewflowError> {
        let start = Instant::now();
        let run_id = ctx.run().run_id_str();
        let span = info_span!("pipeline", pipeline = %self.name, run_id = %run_id);

        async {
            info!(stages = self.stages.len(), "Pipeline started");
            ctx.emit(&StageEvent::pipeline_started(
                &run_id,
                ctx.topic(),
                &self.stage_names(),
            ))
            .await;

            match self.run_stages(&ctx, &run_id).await {
                Ok(outputs) => {
                    let duration_ms = elapsed_ms(start);
                    info!(duration_ms, "Pipeline completed");
                    ctx.emit(&StageEvent::pipeline_completed(&run_id, duration_ms))
                        .await;
                    Ok(PipelineRun {
                        outputs,
                        duration_ms,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Pipeline aborted");
                    ctx.emit(&StageEvent::pipeline_failed(&run_id, &e.to_string()))
                        .await;
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        ctx: &Arc<PipelineContext>,
        run_id: &str,
    ) -> Result<Vec<(String, StageOutput)>, CrewflowError> {
        let mut outputs: Vec<(String, StageOutput)> = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let name = stage.name().to_string();

            if ctx.is_cancelled() {
                let reason = ctx
                    .cancel_reason()
                    .unwrap_or_else(|| format!("cancelled before stage '{name}'"));
                return Err(CrewflowError::Cancelled(reason));
            }

            let inputs = match outputs.last() {
                Some((previous, output)) => {
                    StageInputs::new(ctx.topic()).with_previous(previous.clone(), output.clone())
                }
                None => StageInputs::new(ctx.topic()),
            };
            let stage_ctx = StageContext::new(Arc::clone(ctx), name.clone(), inputs);

            info!(stage = %name, "Stage started");
            ctx.emit(&StageEvent::started(run_id, &name)).await;

            let output = stage
                .execute(&stage_ctx)
                .instrument(info_span!("stage", stage = %name))
                .await;

            match output.status {
                StageStatus::Ok => {}
                StageStatus::Fail => {
                    let message = output.error_message().to_string();
                    ctx.emit(&StageEvent::failed(run_id, &name, &message)).await;
                    return Err(CrewflowError::stage(name, message));
                }
                StageStatus::Cancel => {
                    return Err(CrewflowError::Cancelled(output.error_message().to_string()));
                }
            }

            if let Some(artifact) = &output.artifact {
                if !artifact.is_written() {
                    let message = format!("artifact {} was not written", artifact.path.display());
                    ctx.emit(&StageEvent::failed(run_id, &name, &message)).await;
                    return Err(CrewflowError::stage(name, message));
                }
            }

            info!(stage = %name, duration_ms = output.duration_ms, "Stage completed");
            ctx.emit(&StageEvent::completed(run_id, &name, output.duration_ms))
                .await;
            outputs.push((name, output));
        }

        Ok(outputs)
    }
}

//! Pipeline and stage execution contexts.

use super::{RunIdentity, StageInputs};
use crate::core::StageEvent;
use crate::events::{EventSink, NoOpEventSink};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The shared context for one pipeline run.
///
/// Held behind an `Arc` so a caller can keep a handle and cancel the run
/// from another task. Cancellation is observed before each stage starts.
pub struct PipelineContext {
    run: RunIdentity,
    topic: String,
    event_sink: Arc<dyn EventSink>,
    cancelled: AtomicBool,
    cancel_reason: RwLock<Option<String>>,
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("run", &self.run)
            .field("topic", &self.topic)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl PipelineContext {
    /// Creates a new pipeline context with a no-op event sink.
    #[must_use]
    pub fn new(run: RunIdentity, topic: impl Into<String>) -> Self {
        Self {
            run,
            topic: topic.into(),
            event_sink: Arc::new(NoOpEventSink),
            cancelled: AtomicBool::new(false),
            cancel_reason: RwLock::new(None),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Marks the context as cancelled.
    pub fn mark_cancelled(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Marks the context as cancelled with a reason.
    pub fn mark_cancelled_with_reason(&self, reason: impl Into<String>) {
        *self.cancel_reason.write() = Some(reason.into());
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks if the context is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancel reason, if any.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<String> {
        self.cancel_reason.read().clone()
    }

    /// Returns the run identity.
    #[must_use]
    pub const fn run(&self) -> &RunIdentity {
        &self.run
    }

    /// Returns the run topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the event sink.
    #[must_use]
    pub fn event_sink(&self) -> &Arc<dyn EventSink> {
        &self.event_sink
    }

    /// Emits an event to the sink.
    pub async fn emit(&self, event: &StageEvent) {
        self.event_sink.emit(event).await;
    }
}

/// The context for a single stage execution.
#[derive(Debug)]
pub struct StageContext {
    pipeline_ctx: Arc<PipelineContext>,
    stage_name: String,
    inputs: StageInputs,
}

impl StageContext {
    /// Creates a new stage context.
    #[must_use]
    pub fn new(
        pipeline_ctx: Arc<PipelineContext>,
        stage_name: impl Into<String>,
        inputs: StageInputs,
    ) -> Self {
        Self {
            pipeline_ctx,
            stage_name: stage_name.into(),
            inputs,
        }
    }

    /// Returns the stage name.
    #[must_use]
    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    /// Returns the stage inputs.
    #[must_use]
    pub const fn inputs(&self) -> &StageInputs {
        &self.inputs
    }

    /// Returns the pipeline context.
    #[must_use]
    pub const fn pipeline_ctx(&self) -> &Arc<PipelineContext> {
        &self.pipeline_ctx
    }

    /// Returns the run ID as a string.
    #[must_use]
    pub fn run_id(&self) -> String {
        self.pipeline_ctx.run().run_id_str()
    }

    /// Emits an event without awaiting.
    pub fn try_emit_event(&self, event: &StageEvent) {
        self.pipeline_ctx.event_sink().try_emit(event);
    }

    /// Checks if the run is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.pipeline_ctx.is_cancelled()
    }
}

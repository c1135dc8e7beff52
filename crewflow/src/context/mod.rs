//! Context management for pipeline execution.
//!
//! This module provides:
//! - The run identity threaded through events and spans
//! - The shared pipeline context (event sink, cancellation flag)
//! - Per-stage contexts carrying the typed handoff from the previous stage

mod execution;
mod identity;
mod inputs;

pub use execution::{PipelineContext, StageContext};
pub use identity::RunIdentity;
pub use inputs::StageInputs;

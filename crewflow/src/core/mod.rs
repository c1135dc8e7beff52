//! Core domain model types for crewflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Stage status enum
//! - Stage output type with factory methods
//! - Artifacts, their layout on disk, and lifecycle events

mod artifact;
mod event;
mod output;
mod status;

pub use artifact::{ArtifactKind, ArtifactLayout, StageArtifact, DEFAULT_OUTPUT_DIR};
pub use event::StageEvent;
pub use output::StageOutput;
pub use status::StageStatus;

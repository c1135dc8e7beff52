//! Pipeline building and execution.
//!
//! [`PipelineBuilder`] validates a list of stages into a
//! [`SequentialPipeline`]; [`Crew`] assembles the three-stage content
//! pipeline and turns a finished run into a [`PipelineResult`].

mod builder;
mod crew;
mod result;
mod sequential;

pub use builder::PipelineBuilder;
pub use crew::{Crew, CREW_PIPELINE};
pub use result::PipelineResult;
pub use sequential::{PipelineRun, SequentialPipeline};

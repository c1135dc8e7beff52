//! Event sinks for pipeline lifecycle events.
//!
//! The pipeline reports every stage transition to the [`EventSink`] held by
//! its [`PipelineContext`](crate::context::PipelineContext). There is no
//! process-wide sink; each run carries its own.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

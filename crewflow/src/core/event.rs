//! Lifecycle events emitted while a pipeline runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event emitted during a run.
///
/// Events carry the run id so a sink shared by several runs can tell
/// them apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEvent {
    /// The event type (e.g., "stage.started", "pipeline.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (ISO 8601).
    pub timestamp: String,

    /// The event payload data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl StageEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: crate::utils::iso_timestamp(),
            data: HashMap::new(),
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Returns a string field from the payload.
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }

    /// Creates a "pipeline.started" event.
    #[must_use]
    pub fn pipeline_started(run_id: &str, topic: &str, stages: &[String]) -> Self {
        Self::new("pipeline.started")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("topic", serde_json::json!(topic))
            .add_data("stages", serde_json::json!(stages))
    }

    /// Creates a "pipeline.completed" event.
    #[must_use]
    pub fn pipeline_completed(run_id: &str, duration_ms: f64) -> Self {
        Self::new("pipeline.completed")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "pipeline.failed" event.
    #[must_use]
    pub fn pipeline_failed(run_id: &str, error: &str) -> Self {
        Self::new("pipeline.failed")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("error", serde_json::json!(error))
    }

    /// Creates a "stage.started" event.
    #[must_use]
    pub fn started(run_id: &str, stage_name: &str) -> Self {
        Self::new("stage.started")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("stage", serde_json::json!(stage_name))
    }

    /// Creates a "stage.completed" event.
    #[must_use]
    pub fn completed(run_id: &str, stage_name: &str, duration_ms: f64) -> Self {
        Self::new("stage.completed")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "stage.failed" event.
    #[must_use]
    pub fn failed(run_id: &str, stage_name: &str, error: &str) -> Self {
        Self::new("stage.failed")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("error", serde_json::json!(error))
    }

    /// Creates a "stage.artifact_written" event.
    #[must_use]
    pub fn artifact_written(run_id: &str, stage_name: &str, path: &str, bytes: usize) -> Self {
        Self::new("stage.artifact_written")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("path", serde_json::json!(path))
            .add_data("bytes", serde_json::json!(bytes))
    }

    /// Creates a "tool.invoked" event.
    #[must_use]
    pub fn tool_invoked(run_id: &str, stage_name: &str, tool: &str, ok: bool) -> Self {
        Self::new("tool.invoked")
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("tool", serde_json::json!(tool))
            .add_data("ok", serde_json::json!(ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_add_data() {
        let event = StageEvent::new("test.event")
            .add_data("foo", serde_json::json!("bar"))
            .add_data("count", serde_json::json!(42));

        assert_eq!(event.data.len(), 2);
        assert_eq!(event.data_str("foo"), Some("bar"));
        assert_eq!(event.data_str("count"), None);
    }

    #[test]
    fn test_stage_events_carry_run_id() {
        let event = StageEvent::started("run-1", "research");
        assert_eq!(event.event_type, "stage.started");
        assert_eq!(event.data_str("run_id"), Some("run-1"));
        assert_eq!(event.data_str("stage"), Some("research"));

        let event = StageEvent::completed("run-1", "research", 12.5);
        assert_eq!(event.data.get("duration_ms"), Some(&serde_json::json!(12.5)));
    }

    #[test]
    fn test_pipeline_started_lists_stages() {
        let stages = vec!["research".to_string(), "writing".to_string()];
        let event = StageEvent::pipeline_started("r", "topic", &stages);
        assert_eq!(
            event.data.get("stages"),
            Some(&serde_json::json!(["research", "writing"]))
        );
    }

    #[test]
    fn test_event_serialization_uses_type_key() {
        let event = StageEvent::failed("r", "review", "boom");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "stage.failed");

        let back: StageEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.data_str("error"), Some("boom"));
    }
}

//! Stage output type with factory methods.

use super::{StageArtifact, StageStatus};
use serde::{Deserialize, Serialize};

/// The output of a stage execution.
///
/// `StageOutput` is created through its factory methods and handed to the
/// next stage unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    /// The status of the stage execution.
    pub status: StageStatus,

    /// The text the stage produced.
    #[serde(default)]
    pub content: String,

    /// The artifact the stage wrote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<StageArtifact>,

    /// Error message (for failed or cancelled executions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall-clock duration of the stage.
    #[serde(default)]
    pub duration_ms: f64,
}

impl StageOutput {
    /// Creates a successful output carrying the stage text.
    #[must_use]
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Ok,
            content: content.into(),
            artifact: None,
            error: None,
            duration_ms: 0.0,
        }
    }

    /// Creates a failure output with an error message.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Fail,
            content: String::new(),
            artifact: None,
            error: Some(error.into()),
            duration_ms: 0.0,
        }
    }

    /// Creates a cancel output with a reason.
    #[must_use]
    pub fn cancel(reason: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Cancel,
            content: String::new(),
            artifact: None,
            error: Some(reason.into()),
            duration_ms: 0.0,
        }
    }

    /// Attaches the written artifact.
    #[must_use]
    pub fn with_artifact(mut self, artifact: StageArtifact) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Returns true if the stage succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the error message, or a generic one for outputs without detail.
    #[must_use]
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("stage did not complete")
    }

}

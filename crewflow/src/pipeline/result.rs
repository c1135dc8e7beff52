//! What a crew run returns.

use super::PipelineRun;
use crate::core::ArtifactKind;
use crate::errors::CrewflowError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Artifact paths and final text of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The run that produced the artifacts.
    pub run_id: Uuid,
    /// Path of the research notes.
    pub research_notes: PathBuf,
    /// Path of the draft.
    pub draft: PathBuf,
    /// Path of the final article.
    #[serde(rename = "final")]
    pub final_path: PathBuf,
    /// Text of the final article.
    pub result: String,
    /// Total run time in milliseconds.
    #[serde(default)]
    pub duration_ms: f64,
}

impl PipelineResult {
    /// Collects the artifact paths from a finished run.
    ///
    /// # Errors
    ///
    /// Returns [`CrewflowError::StageExecution`] if a stage did not record
    /// one of the three artifacts.
    pub fn from_run(run_id: Uuid, run: &PipelineRun) -> Result<Self, CrewflowError> {
        let path_of = |kind: ArtifactKind| -> Result<PathBuf, CrewflowError> {
            run.outputs
                .iter()
                .filter_map(|(_, output)| output.artifact.as_ref())
                .find(|artifact| artifact.kind == kind)
                .map(|artifact| artifact.path.clone())
                .ok_or_else(|| CrewflowError::stage(kind.key(), "no artifact was recorded"))
        };

        Ok(Self {
            run_id,
            research_notes: path_of(ArtifactKind::ResearchNotes)?,
            draft: path_of(ArtifactKind::Draft)?,
            final_path: path_of(ArtifactKind::Final)?,
            result: run.last().map(|output| output.content.clone()).unwrap_or_default(),
            duration_ms: run.duration_ms,
        })
    }

    /// Path of one artifact.
    #[must_use]
    pub fn path(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::ResearchNotes => &self.research_notes,
            ArtifactKind::Draft => &self.draft,
            ArtifactKind::Final => &self.final_path,
        }
    }

    /// Reads one artifact back from disk.
    pub async fn read_artifact(&self, kind: ArtifactKind) -> std::io::Result<String> {
        tokio::fs::read_to_string(self.path(kind)).await
    }

    /// The four keys callers rely on: `research_notes`, `draft`, `final`,
    /// `result`.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map: HashMap<String, serde_json::Value> = ArtifactKind::ALL
            .iter()
            .map(|kind| {
                (
                    kind.key().to_string(),
                    serde_json::json!(self.path(*kind).display().to_string()),
                )
            })
            .collect();
        map.insert("result".to_string(), serde_json::json!(self.result));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StageArtifact, StageOutput};

    fn run() -> PipelineRun {
        let stage = |name: &str, kind: ArtifactKind, text: &str| {
            (
                name.to_string(),
                StageOutput::ok(text).with_artifact(StageArtifact::new(
                    kind,
                    Path::new("outputs").join(kind.file_name()),
                    text.len(),
                )),
            )
        };
        PipelineRun {
            outputs: vec![
                stage("research", ArtifactKind::ResearchNotes, "notes"),
                stage("writing", ArtifactKind::Draft, "draft"),
                stage("review", ArtifactKind::Final, "final text"),
            ],
            duration_ms: 12.0,
        }
    }

    #[test]
    fn test_to_dict_has_exactly_four_keys() {
        let result = PipelineResult::from_run(Uuid::new_v4(), &run()).unwrap();
        let dict = result.to_dict();

        let mut keys: Vec<_> = dict.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["draft", "final", "research_notes", "result"]);
        assert_eq!(dict["result"], serde_json::json!("final text"));
        assert_eq!(
            dict["final"],
            serde_json::json!(Path::new("outputs").join("final.md").display().to_string())
        );
    }

    #[test]
    fn test_serializes_final_key() {
        let result = PipelineResult::from_run(Uuid::new_v4(), &run()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("final").is_some());
        assert!(json.get("final_path").is_none());
    }

    #[test]
    fn test_missing_artifact_is_an_error() {
        let mut partial = run();
        partial.outputs.pop();
        let err = PipelineResult::from_run(Uuid::new_v4(), &partial).unwrap_err();
        assert!(err.to_string().contains("final"));
    }
}

//! Artifacts: the markdown files each stage leaves on disk.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default directory artifacts are written into.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// The three artifacts a pipeline run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Output of the research stage.
    ResearchNotes,
    /// Output of the writing stage.
    Draft,
    /// Output of the review stage.
    Final,
}

impl ArtifactKind {
    /// All kinds, in pipeline order.
    pub const ALL: [Self; 3] = [Self::ResearchNotes, Self::Draft, Self::Final];

    /// The key used in result dictionaries.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ResearchNotes => "research_notes",
            Self::Draft => "draft",
            Self::Final => "final",
        }
    }

    /// The file name inside the layout root.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::ResearchNotes => "research_notes.md",
            Self::Draft => "draft.md",
            Self::Final => "final.md",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ResearchNotes => "Research Notes",
            Self::Draft => "Draft",
            Self::Final => "Final Article",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a run writes its artifacts.
///
/// The default layout writes to fixed paths under `outputs/`, so two runs
/// sharing a layout overwrite each other. Use [`ArtifactLayout::run_scoped`]
/// when runs may overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl ArtifactLayout {
    /// Creates a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a layout under `<base>/runs/<run_id>`.
    #[must_use]
    pub fn run_scoped(base: impl AsRef<Path>, run_id: Uuid) -> Self {
        Self {
            root: base.as_ref().join("runs").join(run_id.to_string()),
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of an artifact.
    #[must_use]
    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    /// Creates the root directory if it does not exist.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}

/// An artifact written by a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageArtifact {
    /// Which artifact this is.
    pub kind: ArtifactKind,
    /// Where it was written.
    pub path: PathBuf,
    /// Size of the written content in bytes.
    pub bytes: usize,
    /// When the artifact was written (ISO 8601).
    pub created_at: String,
}

impl StageArtifact {
    /// Creates an artifact record without touching the filesystem.
    #[must_use]
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>, bytes: usize) -> Self {
        Self {
            kind,
            path: path.into(),
            bytes,
            created_at: crate::utils::iso_timestamp(),
        }
    }

    /// Writes `content` to `path`, overwriting any previous file.
    pub async fn write(
        kind: ArtifactKind,
        path: impl Into<PathBuf>,
        content: &str,
    ) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&path, content).await?;
        Ok(Self::new(kind, path, content.len()))
    }

    /// Reads the artifact back as UTF-8 text.
    pub async fn read_to_string(&self) -> std::io::Result<String> {
        tokio::fs::read_to_string(&self.path).await
    }

    /// Whether the file is present and non-empty.
    #[must_use]
    pub fn is_written(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_paths() {
        let layout = ArtifactLayout::default();
        assert_eq!(
            layout.path_for(ArtifactKind::ResearchNotes),
            Path::new("outputs/research_notes.md")
        );
        assert_eq!(layout.path_for(ArtifactKind::Draft), Path::new("outputs/draft.md"));
        assert_eq!(layout.path_for(ArtifactKind::Final), Path::new("outputs/final.md"));
    }

    #[test]
    fn test_run_scoped_layout() {
        let run_id = Uuid::new_v4();
        let layout = ArtifactLayout::run_scoped("outputs", run_id);
        let expected = Path::new("outputs").join("runs").join(run_id.to_string());
        assert_eq!(layout.root(), expected.as_path());
        assert!(layout.path_for(ArtifactKind::Final).ends_with("final.md"));
    }

    #[test]
    fn test_kind_keys_in_order() {
        let keys: Vec<_> = ArtifactKind::ALL.iter().map(|k| k.key()).collect();
        assert_eq!(keys, vec!["research_notes", "draft", "final"]);
        assert_eq!(ArtifactKind::Draft.to_string(), "draft");
    }

    #[tokio::test]
    async fn test_write_overwrites_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("draft.md");

        StageArtifact::write(ArtifactKind::Draft, &path, "first").await.unwrap();
        let artifact = StageArtifact::write(ArtifactKind::Draft, &path, "second run")
            .await
            .unwrap();

        assert!(artifact.is_written());
        assert_eq!(artifact.bytes, "second run".len());
        assert_eq!(artifact.read_to_string().await.unwrap(), "second run");
    }

    #[test]
    fn test_missing_artifact_is_not_written() {
        let artifact = StageArtifact::new(ArtifactKind::Final, "/nonexistent/final.md", 0);
        assert!(!artifact.is_written());
    }
}

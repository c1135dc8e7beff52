//! Stage descriptors for the research, writing and review steps.

use crate::agents::AgentRole;
use crate::context::StageInputs;
use crate::core::{ArtifactKind, ArtifactLayout};
use crate::errors::CrewflowError;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Name of the research stage.
pub const RESEARCH_STAGE: &str = "research";
/// Name of the writing stage.
pub const WRITING_STAGE: &str = "writing";
/// Name of the review stage.
pub const REVIEW_STAGE: &str = "review";

const RESEARCH_INSTRUCTIONS: &str = "Research the topic: '{topic}'.\n\
    - Use web_search and fetch_url tools to gather 5-8 reputable sources.\n\
    - Produce bullet points grouped by subtopic.\n\
    - Include inline citations as [label](url).\n\
    - Be concise and avoid speculation.";
const RESEARCH_EXPECTED: &str = "A concise markdown file with sections, bullet points, and \
    citations. File path: {path}";

const WRITING_INSTRUCTIONS: &str = "Using the research notes, write a 600-800 word article \
    about '{topic}'.\n\
    - Include a short intro, 2-4 headings, and a bulleted 'Key Takeaways' section.\n\
    - Weave in citations where appropriate using [label](url).";
const WRITING_EXPECTED: &str = "A well-structured markdown article ready to publish. \
    File path: {path}";

const REVIEW_INSTRUCTIONS: &str = "Review and improve the draft.\n\
    - Fix inaccuracies, tighten language, ensure logical flow.\n\
    - Ensure all claims that rely on sources have citations.\n\
    - Output the final article.";
const REVIEW_EXPECTED: &str = "Final, polished markdown. File path: {path}";

// The pattern is a literal, so compiling it cannot fail.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid placeholder pattern"));

/// Replaces `{name}` placeholders with their values.
///
/// Unknown placeholders are left untouched.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            vars.iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| (*value).to_string())
        })
        .into_owned()
}

/// One unit of work: who does it, what to do, where the result goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    /// Stage name.
    pub name: String,
    /// Persona that executes the stage.
    pub role: AgentRole,
    /// Task instructions, already bound to the topic.
    pub instructions: String,
    /// Shape of the expected answer.
    pub expected_output: String,
    /// Artifact the stage produces.
    pub artifact: ArtifactKind,
    /// Where the artifact is written.
    pub output_path: PathBuf,
}

impl StageDescriptor {
    fn from_templates(
        name: &str,
        role: AgentRole,
        artifact: ArtifactKind,
        instructions: &str,
        expected: &str,
        topic: &str,
        layout: &ArtifactLayout,
    ) -> Self {
        let output_path = layout.path_for(artifact);
        let path = output_path.display().to_string();
        let vars = [("topic", topic), ("path", path.as_str())];

        Self {
            name: name.to_string(),
            role,
            instructions: render_template(instructions, &vars),
            expected_output: render_template(expected, &vars),
            artifact,
            output_path,
        }
    }

    /// Research step: gather and cite sources.
    #[must_use]
    pub fn research(topic: &str, layout: &ArtifactLayout) -> Self {
        Self::from_templates(
            RESEARCH_STAGE,
            AgentRole::Researcher,
            ArtifactKind::ResearchNotes,
            RESEARCH_INSTRUCTIONS,
            RESEARCH_EXPECTED,
            topic,
            layout,
        )
    }

    /// Writing step: turn the notes into an article.
    #[must_use]
    pub fn writing(topic: &str, layout: &ArtifactLayout) -> Self {
        Self::from_templates(
            WRITING_STAGE,
            AgentRole::Writer,
            ArtifactKind::Draft,
            WRITING_INSTRUCTIONS,
            WRITING_EXPECTED,
            topic,
            layout,
        )
    }

    /// Review step. The instructions do not mention the topic.
    #[must_use]
    pub fn review(layout: &ArtifactLayout) -> Self {
        Self::from_templates(
            REVIEW_STAGE,
            AgentRole::Reviewer,
            ArtifactKind::Final,
            REVIEW_INSTRUCTIONS,
            REVIEW_EXPECTED,
            "",
            layout,
        )
    }

    /// Builds the user prompt for this stage from its inputs.
    ///
    /// The reviewer works only from the draft, so its prompt carries no topic.
    #[must_use]
    pub fn prompt(&self, inputs: &StageInputs) -> String {
        let mut prompt = format!("{}\n\nExpected output: {}", self.instructions, self.expected_output);
        if self.role != AgentRole::Reviewer {
            prompt.push_str(&format!("\n\nTopic: {}", inputs.topic()));
        }

        if let Some(previous) = inputs.previous_content() {
            let stage = inputs.previous_stage().unwrap_or("previous");
            prompt.push_str(&format!(
                "\n\nOutput of the {stage} stage, use it as your context:\n\n{previous}"
            ));
        }

        prompt
    }
}

/// Builds the research, writing and review descriptors in pipeline order.
///
/// Creates the layout directory; otherwise pure.
///
/// # Errors
///
/// Returns [`CrewflowError::Io`] if the directory cannot be created.
pub fn build_stage_descriptors(
    topic: &str,
    layout: &ArtifactLayout,
) -> Result<Vec<StageDescriptor>, CrewflowError> {
    layout.ensure_dir()?;

    Ok(vec![
        StageDescriptor::research(topic, layout),
        StageDescriptor::writing(topic, layout),
        StageDescriptor::review(layout),
    ])
}

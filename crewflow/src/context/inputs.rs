//! Typed handoff between consecutive stages.

use crate::core::StageOutput;

/// What a stage receives: the run topic and the previous stage's output.
///
/// The first stage sees no previous output.
#[derive(Debug, Clone, Default)]
pub struct StageInputs {
    topic: String,
    previous: Option<(String, StageOutput)>,
}

impl StageInputs {
    /// Creates inputs for the first stage of a run.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            previous: None,
        }
    }

    /// Attaches the output of the stage that ran before.
    #[must_use]
    pub fn with_previous(mut self, stage_name: impl Into<String>, output: StageOutput) -> Self {
        self.previous = Some((stage_name.into(), output));
        self
    }

    /// Returns the run topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the previous stage's output.
    #[must_use]
    pub fn previous(&self) -> Option<&StageOutput> {
        self.previous.as_ref().map(|(_, output)| output)
    }

    /// Returns the previous stage's name.
    #[must_use]
    pub fn previous_stage(&self) -> Option<&str> {
        self.previous.as_ref().map(|(name, _)| name.as_str())
    }

    /// Returns the previous stage's text, if it produced any.
    #[must_use]
    pub fn previous_content(&self) -> Option<&str> {
        self.previous()
            .map(|output| output.content.as_str())
            .filter(|content| !content.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_stage_has_no_previous() {
        let inputs = StageInputs::new("rust async");
        assert_eq!(inputs.topic(), "rust async");
        assert!(inputs.previous().is_none());
        assert!(inputs.previous_content().is_none());
    }

    #[test]
    fn test_with_previous() {
        let inputs = StageInputs::new("t").with_previous("research", StageOutput::ok("- notes"));
        assert_eq!(inputs.previous_stage(), Some("research"));
        assert_eq!(inputs.previous_content(), Some("- notes"));
    }

    #[test]
    fn test_blank_previous_content_is_none() {
        let inputs = StageInputs::new("t").with_previous("research", StageOutput::ok("  \n"));
        assert!(inputs.previous().is_some());
        assert!(inputs.previous_content().is_none());
    }
}

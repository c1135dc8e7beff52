//! The three personas of the crew.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which persona an agent plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Gathers sources with the web tools.
    Researcher,
    /// Turns research notes into an article.
    Writer,
    /// Edits the draft into the final article.
    Reviewer,
}

impl AgentRole {
    /// All roles in pipeline order.
    pub const ALL: [Self; 3] = [Self::Researcher, Self::Writer, Self::Reviewer];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Researcher => "Researcher",
            Self::Writer => "Writer",
            Self::Reviewer => "Reviewer",
        }
    }

    /// What the agent is trying to achieve.
    #[must_use]
    pub const fn goal(self) -> &'static str {
        match self {
            Self::Researcher => {
                "Find reputable, recent sources on the given topic; extract key facts, \
                 numbers, and concise bullet points with URLs."
            }
            Self::Writer => {
                "Write a clear, engaging, 600-800 word article that synthesizes the research \
                 into a practical narrative for senior engineers."
            }
            Self::Reviewer => {
                "Critique the draft for accuracy, completeness, and flow. Tighten language, \
                 add missing context, and ensure sources are cited."
            }
        }
    }

    /// Behavioral constraints.
    #[must_use]
    pub const fn backstory(self) -> &'static str {
        match self {
            Self::Researcher => {
                "You are a meticulous OSINT analyst who values verifiable sources, citation \
                 discipline, and clarity. You avoid speculation: only facts from sources you can cite."
            }
            Self::Writer => {
                "You are a senior developer advocate and technical writer with a knack for \
                 structure, headings, and crisp takeaways."
            }
            Self::Reviewer => {
                "You are a tough but fair editor. You spot logical gaps, remove fluff, and ensure \
                 the final output is precise and useful."
            }
        }
    }

    /// Only the researcher is bound to the web tools.
    #[must_use]
    pub const fn uses_tools(self) -> bool {
        matches!(self, Self::Researcher)
    }

    /// The system message for this persona.
    #[must_use]
    pub fn system_prompt(self) -> String {
        format!(
            "You are the {name}.\n{backstory}\n\nYour goal: {goal}",
            name = self.name(),
            backstory = self.backstory(),
            goal = self.goal(),
        )
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_researcher_uses_tools() {
        let with_tools: Vec<_> = AgentRole::ALL.iter().filter(|r| r.uses_tools()).collect();
        assert_eq!(with_tools, vec![&AgentRole::Researcher]);
    }

    #[test]
    fn test_system_prompt_mentions_role_and_goal() {
        let prompt = AgentRole::Writer.system_prompt();
        assert!(prompt.starts_with("You are the Writer."));
        assert!(prompt.contains("600-800 word article"));
        assert!(prompt.contains("developer advocate"));
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&AgentRole::Reviewer).unwrap(), "\"reviewer\"");
        assert_eq!(AgentRole::Researcher.to_string(), "Researcher");
    }
}

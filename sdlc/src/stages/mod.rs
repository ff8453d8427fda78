//! Stage nodes: one `Node<SdlcState>` per processing step of the workflow.
//!
//! Each stage checks its inputs (`AgentError::MissingPrecondition`), builds a
//! prompt from [`StagePrompts`], calls the provider, parses the reply (falling
//! back to raw text) and writes its own fields. All return `Next::Continue`;
//! routing lives in the graph.

mod code;
mod deployment;
mod design_document;
mod parsers;
mod prompts;
mod qa_testing;
mod requirements;
mod security_review;
mod test_cases;
mod user_stories;

pub use code::{code_path, CodeNode, CodePath};
pub use deployment::DeploymentNode;
pub use design_document::DesignDocumentNode;
pub use parsers::{
    parse_generated_code, split_test_cases, test_case_file_name, GeneratedFile,
    DEFAULT_CODE_FILENAME,
};
pub use prompts::{render, PromptLoadError, StagePrompt, StagePrompts};
pub use qa_testing::QaTestingNode;
pub use requirements::RequirementsNode;
pub use security_review::SecurityReviewNode;
pub use test_cases::TestCasesNode;
pub use user_stories::UserStoriesNode;

use std::sync::Arc;

use crate::llm::LlmClient;

/// What every provider-backed stage holds: the client and the templates.
#[derive(Clone)]
pub struct StageDeps {
    pub llm: Arc<dyn LlmClient>,
    pub prompts: Arc<StagePrompts>,
}

impl StageDeps {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<StagePrompts>) -> Self {
        Self { llm, prompts }
    }
}

/// `- item` per line, for feedback and story lists inside prompts.
pub(crate) fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fallback for list-shaped replies: non-empty lines with list markers
/// (`-`, `*`, `1.`, `2)`) and fence lines removed.
pub(crate) fn lines_as_items(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("```"))
        .map(strip_list_marker)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
    {
        return rest.trim();
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_as_items_strips_markers() {
        let raw = "```\n1. As a user, I log in\n- As an admin, I lock accounts\n\n* As a guest, I browse\n2) Plain\n```";
        assert_eq!(
            lines_as_items(raw),
            vec![
                "As a user, I log in",
                "As an admin, I lock accounts",
                "As a guest, I browse",
                "Plain"
            ]
        );
    }

    #[test]
    fn bullet_list_skips_blank_items() {
        let items = vec!["add MFA story".to_string(), " ".to_string(), "x".to_string()];
        assert_eq!(bullet_list(&items), "- add MFA story\n- x");
    }
}

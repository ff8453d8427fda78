//! Workflow state: one [`SdlcState`] per thread id, persisted in every checkpoint.
//!
//! Stage outputs are fully replaced on re-entry; gate feedback accumulates.

mod review_status;

pub use review_status::{is_denied, ReviewStatus};

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Design document sections produced by the design stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignDocument {
    pub functional: Vec<String>,
    pub technical: Vec<String>,
    pub assumptions: Vec<String>,
    pub open_questions: Vec<String>,
}

impl DesignDocument {
    pub fn is_empty(&self) -> bool {
        self.functional.is_empty()
            && self.technical.is_empty()
            && self.assumptions.is_empty()
            && self.open_questions.is_empty()
    }

    /// Markdown rendering used in prompts and by `sdlc show`. Empty sections are omitted.
    pub fn to_markdown(&self) -> String {
        let sections = [
            ("Functional Requirements", &self.functional),
            ("Technical Requirements", &self.technical),
            ("Assumptions", &self.assumptions),
            ("Open Questions / Risks", &self.open_questions),
        ];
        let mut out = String::new();
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("## {}\n", title));
            for item in items {
                out.push_str(&format!("- {}\n", item.trim()));
            }
        }
        out
    }
}

/// Full state of one SDLC run.
///
/// `*_status` fields are written by gate resolutions; `None` routes as approval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdlcState {
    pub requirements: String,

    pub user_stories: Vec<String>,
    pub user_story_status: Option<ReviewStatus>,
    pub user_story_feedback: Vec<String>,

    pub design_document: DesignDocument,
    pub design_document_review_status: Option<ReviewStatus>,
    pub design_document_review_feedback: Vec<String>,

    /// Raw multi-file text; see `stages::parse_generated_code`.
    pub code: String,
    pub code_review_status: Option<ReviewStatus>,
    pub code_review_feedback: Vec<String>,

    pub security_review_status: Option<ReviewStatus>,
    pub security_review_feedback: String,

    /// Raw blocks separated by `---` lines; see `stages::split_test_cases`.
    pub test_cases: String,
    pub test_cases_review_status: Option<ReviewStatus>,
    pub test_cases_review_feedback: Vec<String>,

    pub qa_review_status: Option<ReviewStatus>,
    pub qa_review_feedback: Vec<String>,

    /// Empty until the deployment stage ran.
    pub deployment: String,
}

impl SdlcState {
    /// Initial state for a new run.
    pub fn new(requirements: impl Into<String>) -> Self {
        Self {
            requirements: requirements.into(),
            ..Self::default()
        }
    }

    pub fn is_deployed(&self) -> bool {
        !self.deployment.is_empty()
    }
}

/// Fails with `MissingPrecondition(field)` when `value` is blank.
pub fn require_text(field: &str, value: &str) -> Result<(), AgentError> {
    if value.trim().is_empty() {
        return Err(AgentError::missing(field));
    }
    Ok(())
}

/// Fails with `MissingPrecondition(field)` when `items` has no non-blank entry.
pub fn require_items(field: &str, items: &[String]) -> Result<(), AgentError> {
    if items.iter().all(|s| s.trim().is_empty()) {
        return Err(AgentError::missing(field));
    }
    Ok(())
}

/// Code generation needs both the functional and the technical sections.
pub fn require_design(design: &DesignDocument) -> Result<(), AgentError> {
    require_items("design_document.functional", &design.functional)?;
    require_items("design_document.technical", &design.technical)
}

//! The six human gates and the patch a gate resolution applies to state.

use std::fmt;

use crate::state::{ReviewStatus, SdlcState};

use super::nodes;

/// A human approval point in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    UserStoryApproval,
    DesignDocumentReview,
    CodeReview,
    SecurityReview,
    TestCasesReview,
    QaReview,
}

impl Gate {
    pub const ALL: [Gate; 6] = [
        Gate::UserStoryApproval,
        Gate::DesignDocumentReview,
        Gate::CodeReview,
        Gate::SecurityReview,
        Gate::TestCasesReview,
        Gate::QaReview,
    ];

    pub fn node_id(self) -> &'static str {
        match self {
            Gate::UserStoryApproval => nodes::USER_STORY_APPROVAL,
            Gate::DesignDocumentReview => nodes::DESIGN_DOCUMENT_REVIEW,
            Gate::CodeReview => nodes::CODE_REVIEW,
            Gate::SecurityReview => nodes::SECURITY_REVIEW_APPROVAL,
            Gate::TestCasesReview => nodes::TEST_CASES_REVIEW,
            Gate::QaReview => nodes::QA_REVIEW,
        }
    }

    /// Short name accepted on the command line.
    pub fn alias(self) -> &'static str {
        match self {
            Gate::UserStoryApproval => "user-stories",
            Gate::DesignDocumentReview => "design",
            Gate::CodeReview => "code",
            Gate::SecurityReview => "security",
            Gate::TestCasesReview => "test-cases",
            Gate::QaReview => "qa",
        }
    }

    /// Looks up a gate by node id or alias.
    pub fn parse(name: &str) -> Option<Gate> {
        let name = name.trim();
        Gate::ALL
            .into_iter()
            .find(|g| g.node_id() == name || g.alias().eq_ignore_ascii_case(name))
    }

    /// Node run next on approval.
    pub fn on_approve(self) -> &'static str {
        match self {
            Gate::UserStoryApproval => nodes::DESIGN_DOCUMENT,
            Gate::DesignDocumentReview => nodes::GENERATE_CODE,
            Gate::CodeReview => nodes::SECURITY_REVIEW,
            Gate::SecurityReview => nodes::WRITE_TEST_CASES,
            Gate::TestCasesReview => nodes::QA_TESTING,
            Gate::QaReview => nodes::DEPLOYMENT,
        }
    }

    /// Node re-entered on denial. Security and QA denials regenerate code.
    pub fn on_deny(self) -> &'static str {
        match self {
            Gate::UserStoryApproval => nodes::USER_STORIES,
            Gate::DesignDocumentReview => nodes::DESIGN_DOCUMENT,
            Gate::CodeReview
            | Gate::SecurityReview
            | Gate::QaReview => nodes::GENERATE_CODE,
            Gate::TestCasesReview => nodes::WRITE_TEST_CASES,
        }
    }

    /// The status field this gate routes on.
    pub fn status(self, state: &SdlcState) -> &Option<ReviewStatus> {
        match self {
            Gate::UserStoryApproval => &state.user_story_status,
            Gate::DesignDocumentReview => &state.design_document_review_status,
            Gate::CodeReview => &state.code_review_status,
            Gate::SecurityReview => &state.security_review_status,
            Gate::TestCasesReview => &state.test_cases_review_status,
            Gate::QaReview => &state.qa_review_status,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_id())
    }
}

/// External decision for a gate: the status to record and optional feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatePatch {
    pub status: Option<ReviewStatus>,
    pub feedback: Option<String>,
}

impl GatePatch {
    pub fn approve() -> Self {
        Self {
            status: Some(ReviewStatus::Approve),
            feedback: None,
        }
    }

    pub fn deny(feedback: impl Into<String>) -> Self {
        Self {
            status: Some(ReviewStatus::Denied),
            feedback: Some(feedback.into()),
        }
    }

    pub fn new(status: Option<ReviewStatus>, feedback: Option<String>) -> Self {
        Self { status, feedback }
    }

    /// Writes the patch into `gate`'s fields.
    ///
    /// The status is always replaced (an absent status clears it). Non-blank
    /// feedback is appended to list-shaped feedback; security feedback is a
    /// single text and is replaced.
    pub fn apply(self, gate: Gate, state: &mut SdlcState) {
        let feedback = self
            .feedback
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        let (status, list) = match gate {
            Gate::UserStoryApproval => (&mut state.user_story_status, &mut state.user_story_feedback),
            Gate::DesignDocumentReview => (
                &mut state.design_document_review_status,
                &mut state.design_document_review_feedback,
            ),
            Gate::CodeReview => (&mut state.code_review_status, &mut state.code_review_feedback),
            Gate::TestCasesReview => (
                &mut state.test_cases_review_status,
                &mut state.test_cases_review_feedback,
            ),
            Gate::QaReview => (&mut state.qa_review_status, &mut state.qa_review_feedback),
            Gate::SecurityReview => {
                state.security_review_status = self.status;
                if let Some(text) = feedback {
                    state.security_review_feedback = text;
                }
                return;
            }
        };
        *status = self.status;
        if let Some(text) = feedback {
            list.push(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_node_id_and_alias() {
        assert_eq!(Gate::parse("Human Code Review"), Some(Gate::CodeReview));
        assert_eq!(Gate::parse("QA"), Some(Gate::QaReview));
        assert_eq!(Gate::parse("Generate Code"), None);
        for gate in Gate::ALL {
            assert_eq!(Gate::parse(gate.node_id()), Some(gate));
        }
    }

    /// **Scenario**: a denial appends feedback; a later approval keeps the history.
    #[test]
    fn apply_appends_list_feedback_and_replaces_status() {
        let mut state = SdlcState::new("x");
        GatePatch::deny("add MFA story").apply(Gate::UserStoryApproval, &mut state);
        assert_eq!(state.user_story_status, Some(ReviewStatus::Denied));
        GatePatch::deny("  ").apply(Gate::UserStoryApproval, &mut state);
        GatePatch::approve().apply(Gate::UserStoryApproval, &mut state);
        assert_eq!(state.user_story_status, Some(ReviewStatus::Approve));
        assert_eq!(state.user_story_feedback, vec!["add MFA story"]);
    }

    /// **Scenario**: security feedback is replaced only when new text is given.
    #[test]
    fn apply_replaces_security_feedback() {
        let mut state = SdlcState::new("x");
        state.security_review_feedback = "stage findings".into();
        GatePatch::approve().apply(Gate::SecurityReview, &mut state);
        assert_eq!(state.security_review_feedback, "stage findings");
        GatePatch::deny("hash passwords").apply(Gate::SecurityReview, &mut state);
        assert_eq!(state.security_review_feedback, "hash passwords");
        assert_eq!(state.security_review_status, Some(ReviewStatus::Denied));
    }

    #[test]
    fn absent_status_clears_previous_one() {
        let mut state = SdlcState::new("x");
        state.qa_review_status = Some(ReviewStatus::Denied);
        GatePatch::default().apply(Gate::QaReview, &mut state);
        assert_eq!(state.qa_review_status, None);
    }

    #[test]
    fn denial_routes() {
        assert_eq!(Gate::SecurityReview.on_deny(), nodes::GENERATE_CODE);
        assert_eq!(Gate::QaReview.on_deny(), nodes::GENERATE_CODE);
        assert_eq!(Gate::TestCasesReview.on_deny(), nodes::WRITE_TEST_CASES);
    }
}

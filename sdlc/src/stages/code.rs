//! Code generation with three-way regeneration dispatch.
//!
//! The stage is entered from the design review, and re-entered after a denial
//! at the code review, security review or QA review gate. Each re-entry path
//! has its own template carrying only that path's feedback.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::state::{is_denied, require_design, SdlcState};
use crate::workflow::nodes;

use super::{bullet_list, parse_generated_code, StageDeps, StagePrompt};

/// Which prompt the code stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePath {
    Initial,
    AfterCodeReview,
    AfterSecurityReview,
    AfterQaReview,
}

/// First denied status wins, checked as code review, security review, QA.
pub fn code_path(state: &SdlcState) -> CodePath {
    if is_denied(&state.code_review_status) {
        CodePath::AfterCodeReview
    } else if is_denied(&state.security_review_status) {
        CodePath::AfterSecurityReview
    } else if is_denied(&state.qa_review_status) {
        CodePath::AfterQaReview
    } else {
        CodePath::Initial
    }
}

pub struct CodeNode {
    deps: StageDeps,
}

impl CodeNode {
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }

    fn template(&self, path: CodePath) -> &StagePrompt {
        let prompts = &self.deps.prompts;
        match path {
            CodePath::Initial => &prompts.code_generate,
            CodePath::AfterCodeReview => &prompts.code_after_code_review,
            CodePath::AfterSecurityReview => &prompts.code_after_security_review,
            CodePath::AfterQaReview => &prompts.code_after_qa_review,
        }
    }
}

#[async_trait]
impl Node<SdlcState> for CodeNode {
    fn id(&self) -> &str {
        nodes::GENERATE_CODE
    }

    async fn run(&self, state: SdlcState) -> Result<(SdlcState, Next), AgentError> {
        require_design(&state.design_document)?;

        let path = code_path(&state);
        let design = state.design_document.to_markdown();
        let code_review_feedback = bullet_list(&state.code_review_feedback);
        let qa_feedback = bullet_list(&state.qa_review_feedback);
        let vars = [
            ("design_document", design.as_str()),
            ("code_review_feedback", code_review_feedback.as_str()),
            ("security_feedback", state.security_review_feedback.trim()),
            ("qa_feedback", qa_feedback.as_str()),
            ("previous_code", state.code.trim()),
        ];
        tracing::debug!(path = ?path, "generating code");
        let messages = self.template(path).messages(&vars);

        let response = self.deps.llm.invoke(&messages).await?;
        let code = response.content.trim().to_string();
        tracing::debug!(
            files = parse_generated_code(&code).len(),
            "code generated"
        );

        Ok((SdlcState { code, ..state }, Next::Continue))
    }
}

//! Security review of the generated code.
//!
//! Writes the findings to `security_review_feedback` and the reviewer's
//! advisory status to `security_review_status`; the human gate that follows
//! replaces that status with its own decision.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{invoke_structured, ProviderOutput};
use crate::state::{require_text, ReviewStatus, SdlcState};
use crate::workflow::nodes;

use super::StageDeps;

#[derive(Debug, Deserialize)]
struct SecurityReply {
    #[serde(default)]
    status: Option<String>,
    review: String,
}

pub struct SecurityReviewNode {
    deps: StageDeps,
}

impl SecurityReviewNode {
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Node<SdlcState> for SecurityReviewNode {
    fn id(&self) -> &str {
        nodes::SECURITY_REVIEW
    }

    async fn run(&self, state: SdlcState) -> Result<(SdlcState, Next), AgentError> {
        require_text("code", &state.code)?;

        let messages = self
            .deps
            .prompts
            .security_review
            .messages(&[("code", state.code.trim())]);
        let (feedback, status) =
            match invoke_structured::<SecurityReply>(self.deps.llm.as_ref(), &messages).await? {
                ProviderOutput::Structured(reply) => (
                    reply.review.trim().to_string(),
                    reply.status.as_deref().map(|s| ReviewStatus::parse(s.trim())),
                ),
                ProviderOutput::RawText(raw) => (raw.trim().to_string(), None),
            };
        tracing::debug!(status = ?status, "security review written");

        Ok((
            SdlcState {
                security_review_feedback: feedback,
                security_review_status: status,
                ..state
            },
            Next::Continue,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::MockLlm;
    use crate::stages::StagePrompts;

    fn node(llm: Arc<MockLlm>) -> SecurityReviewNode {
        SecurityReviewNode::new(StageDeps::new(
            llm,
            Arc::new(StagePrompts::embedded().unwrap()),
        ))
    }

    fn coded_state() -> SdlcState {
        let mut state = SdlcState::new("x");
        state.code = "print('hi')".into();
        state
    }

    #[tokio::test]
    async fn structured_review_sets_feedback_and_status() {
        let llm = Arc::new(MockLlm::new(
            r#"{"status": "Denied", "review": "Passwords stored in plain text."}"#,
        ));
        let (state, _) = node(llm.clone()).run(coded_state()).await.unwrap();
        assert_eq!(state.security_review_feedback, "Passwords stored in plain text.");
        assert_eq!(state.security_review_status, Some(ReviewStatus::Denied));
        assert!(llm.last_prompt_text().unwrap().contains("print('hi')"));
    }

    /// **Scenario**: free-text review is stored as-is and clears any previous status.
    #[tokio::test]
    async fn raw_review_is_stored_verbatim() {
        let llm = Arc::new(MockLlm::new("  Looks fine overall.  "));
        let mut state = coded_state();
        state.security_review_status = Some(ReviewStatus::Denied);
        let (state, _) = node(llm).run(state).await.unwrap();
        assert_eq!(state.security_review_feedback, "Looks fine overall.");
        assert_eq!(state.security_review_status, None);
    }

    #[tokio::test]
    async fn requires_code() {
        let err = node(Arc::new(MockLlm::new("x")))
            .run(SdlcState::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MissingPrecondition(ref f) if f == "code"));
    }
}

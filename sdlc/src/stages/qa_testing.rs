//! QA evaluation of the test cases against the code.
//!
//! Replaces `qa_review_feedback` with the findings and writes an advisory
//! `qa_review_status`, both of which the human QA gate then extends or replaces.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{invoke_structured, ProviderOutput};
use crate::state::{require_text, ReviewStatus, SdlcState};
use crate::workflow::nodes;

use super::{lines_as_items, StageDeps};

#[derive(Debug, Deserialize)]
struct QaReply {
    #[serde(default)]
    status: Option<String>,
    feedback: Vec<String>,
}

pub struct QaTestingNode {
    deps: StageDeps,
}

impl QaTestingNode {
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Node<SdlcState> for QaTestingNode {
    fn id(&self) -> &str {
        nodes::QA_TESTING
    }

    async fn run(&self, state: SdlcState) -> Result<(SdlcState, Next), AgentError> {
        require_text("code", &state.code)?;
        require_text("test_cases", &state.test_cases)?;

        let messages = self.deps.prompts.qa_testing.messages(&[
            ("code", state.code.trim()),
            ("test_cases", state.test_cases.trim()),
        ]);
        let (feedback, status) =
            match invoke_structured::<QaReply>(self.deps.llm.as_ref(), &messages).await? {
                ProviderOutput::Structured(reply) => (
                    reply
                        .feedback
                        .into_iter()
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                    reply.status.as_deref().map(|s| ReviewStatus::parse(s.trim())),
                ),
                ProviderOutput::RawText(raw) => (lines_as_items(&raw), None),
            };
        tracing::debug!(findings = feedback.len(), status = ?status, "qa testing done");

        Ok((
            SdlcState {
                qa_review_feedback: feedback,
                qa_review_status: status,
                ..state
            },
            Next::Continue,
        ))
    }
}

//! Test case writing from the user stories and the generated code.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::state::{is_denied, require_items, require_text, SdlcState};
use crate::workflow::nodes;

use super::{bullet_list, split_test_cases, StageDeps};

pub struct TestCasesNode {
    deps: StageDeps,
}

impl TestCasesNode {
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Node<SdlcState> for TestCasesNode {
    fn id(&self) -> &str {
        nodes::WRITE_TEST_CASES
    }

    async fn run(&self, state: SdlcState) -> Result<(SdlcState, Next), AgentError> {
        require_text("code", &state.code)?;
        require_items("user_stories", &state.user_stories)?;

        let stories = bullet_list(&state.user_stories);
        let feedback = bullet_list(&state.test_cases_review_feedback);
        let vars = [
            ("user_stories", stories.as_str()),
            ("code", state.code.trim()),
            ("feedback", feedback.as_str()),
            ("previous_test_cases", state.test_cases.trim()),
        ];
        let prompt = &self.deps.prompts.test_cases;
        let messages = if is_denied(&state.test_cases_review_status) && !feedback.is_empty() {
            prompt.revision_messages(&vars)
        } else {
            prompt.messages(&vars)
        };

        let response = self.deps.llm.invoke(&messages).await?;
        let test_cases = response.content.trim().to_string();
        tracing::debug!(
            count = split_test_cases(&test_cases).len(),
            "test cases written"
        );

        Ok((
            SdlcState {
                test_cases,
                ..state
            },
            Next::Continue,
        ))
    }
}

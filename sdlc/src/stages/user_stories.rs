//! User story generation from the requirements; revises on a denied gate.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{invoke_structured, ProviderOutput};
use crate::state::{is_denied, require_text, SdlcState};
use crate::workflow::nodes;

use super::{bullet_list, lines_as_items, StageDeps};

#[derive(Debug, Deserialize)]
struct UserStoriesReply {
    #[serde(alias = "stories")]
    user_stories: Vec<String>,
}

pub struct UserStoriesNode {
    deps: StageDeps,
}

impl UserStoriesNode {
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Node<SdlcState> for UserStoriesNode {
    fn id(&self) -> &str {
        nodes::USER_STORIES
    }

    async fn run(&self, state: SdlcState) -> Result<(SdlcState, Next), AgentError> {
        require_text("requirements", &state.requirements)?;

        let feedback = bullet_list(&state.user_story_feedback);
        let vars = [
            ("requirements", state.requirements.as_str()),
            ("feedback", feedback.as_str()),
        ];
        let prompt = &self.deps.prompts.user_stories;
        let messages = if is_denied(&state.user_story_status) && !feedback.is_empty() {
            prompt.revision_messages(&vars)
        } else {
            prompt.messages(&vars)
        };

        let user_stories =
            match invoke_structured::<UserStoriesReply>(self.deps.llm.as_ref(), &messages).await? {
                ProviderOutput::Structured(reply) => reply
                    .user_stories
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                ProviderOutput::RawText(raw) => lines_as_items(&raw),
            };
        tracing::debug!(count = user_stories.len(), "user stories generated");

        Ok((
            SdlcState {
                user_stories,
                ..state
            },
            Next::Continue,
        ))
    }
}

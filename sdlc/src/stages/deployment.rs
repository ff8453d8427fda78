//! Deployment: marks the run deployed. No provider call.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::state::{require_text, SdlcState};
use crate::workflow::nodes;

use super::parse_generated_code;

#[derive(Debug, Default)]
pub struct DeploymentNode;

impl DeploymentNode {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Node<SdlcState> for DeploymentNode {
    fn id(&self) -> &str {
        nodes::DEPLOYMENT
    }

    async fn run(&self, state: SdlcState) -> Result<(SdlcState, Next), AgentError> {
        require_text("code", &state.code)?;
        let files = parse_generated_code(&state.code).len();
        let deployment = format!(
            "Deployed {} file(s) at {}",
            files,
            chrono::Utc::now().to_rfc3339()
        );
        tracing::info!(files, "deployment recorded");
        Ok((
            SdlcState {
                deployment,
                ..state
            },
            Next::Continue,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_non_empty_marker() {
        let mut state = SdlcState::new("x");
        state.code = "Filename: a.py\n```python\nA\n```\nFilename: b.py\n```python\nB\n```".into();
        let (state, _) = DeploymentNode::new().run(state).await.unwrap();
        assert!(state.is_deployed());
        assert!(state.deployment.starts_with("Deployed 2 file(s) at "));
    }

    #[tokio::test]
    async fn requires_code() {
        let err = DeploymentNode::new()
            .run(SdlcState::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MissingPrecondition(ref f) if f == "code"));
    }
}

//! Requirements intake: normalizes the seeded requirement text. No provider call.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::state::{require_text, SdlcState};
use crate::workflow::nodes;

#[derive(Debug, Default)]
pub struct RequirementsNode;

impl RequirementsNode {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Node<SdlcState> for RequirementsNode {
    fn id(&self) -> &str {
        nodes::REQUIREMENTS
    }

    async fn run(&self, state: SdlcState) -> Result<(SdlcState, Next), AgentError> {
        require_text("requirements", &state.requirements)?;
        let requirements = state.requirements.trim().to_string();
        Ok((
            SdlcState {
                requirements,
                ..state
            },
            Next::Continue,
        ))
    }
}

//! Gate node: a no-op node that exists as a human approval point.
//!
//! Registered in a graph and listed in `interrupt_before`, so `advance` halts
//! before it. `invoke` (no interrupts) passes through it unchanged.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::AgentError;

use super::Next;
use super::Node;

/// Pass-through node carrying only a name.
///
/// Use with `StateGraph::add_node(id, Arc::new(GateNode::new(id)))` plus
/// `add_conditional_edges(id, router, ..)` so the gate routes on the decision
/// written into state by `update_state`.
pub struct GateNode {
    name: String,
}

impl GateNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl<S> Node<S> for GateNode
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn id(&self) -> &str {
        &self.name
    }

    async fn run(&self, state: S) -> Result<(S, Next), AgentError> {
        Ok((state, Next::Continue))
    }
}

//! Next-step result from a graph node: continue along the edge, jump to a node, or end.

/// Next step after running a node.
///
/// - **Continue**: follow the node's outgoing edge (END if it has none).
/// - **Node(id)**: jump to the given node.
/// - **End**: stop; the current state is final.
///
/// Ignored for nodes with conditional edges; the router decides instead.
///
/// **Interaction**: Returned by `Node::run`; consumed by `CompiledStateGraph::advance`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the outgoing edge; if the node has none, equivalent to End.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}

//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when edges, conditional targets or
//! interrupt points reference unknown nodes, or the graph has no entry/exit.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A node id in an edge was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge has from_id == START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// Neither an edge nor a conditional path reaches END.
    #[error("graph must have an edge to END")]
    MissingEnd,

    /// More than one outgoing edge from the same node, or from START.
    #[error("invalid edges: {0}")]
    InvalidChain(String),

    /// A node has both an outgoing edge and conditional edges; it must have exactly one.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A value in a conditional path_map is not a valid node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),

    /// An `interrupt_before` entry names a node that was never added.
    #[error("interrupt node not found: {0}")]
    InterruptNodeNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of NodeNotFound contains "node not found" and the node id.
    #[test]
    fn compilation_error_display_node_not_found() {
        let s = CompilationError::NodeNotFound("x".to_string()).to_string();
        assert!(s.contains("node not found"), "{}", s);
        assert!(s.contains("x"), "{}", s);
    }

    /// **Scenario**: Display of MissingStart and MissingEnd mention START and END.
    #[test]
    fn compilation_error_display_missing_start_and_end() {
        assert!(CompilationError::MissingStart.to_string().contains("START"));
        assert!(CompilationError::MissingEnd.to_string().contains("END"));
    }

    /// **Scenario**: Display of InterruptNodeNotFound names the offending id.
    #[test]
    fn compilation_error_display_interrupt_node() {
        let s = CompilationError::InterruptNodeNotFound("gate".into()).to_string();
        assert!(s.contains("interrupt") && s.contains("gate"), "{}", s);
    }
}

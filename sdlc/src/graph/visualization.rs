//! Text rendering of a compiled graph: nodes in insertion order, each with its
//! outgoing edges. Interrupt points are marked.

use std::fmt::Debug;

use super::conditional::NextEntry;
use super::CompiledStateGraph;
use super::{END, START};

/// Generate a simple text representation of the graph structure.
///
/// ```text
/// Graph Structure:
/// Nodes: 3
///
///   __start__ -> produce
///   produce -> gate
///   [gate] (interrupt) -> finish | produce
///   finish -> __end__
/// ```
pub fn generate_text<S>(graph: &CompiledStateGraph<S>) -> String
where
    S: Clone + Send + Sync + Debug + 'static,
{
    let mut text = String::from("Graph Structure:\n");
    text.push_str(&format!("Nodes: {}\n\n", graph.node_order.len()));
    text.push_str(&format!("  {} -> {}\n", START, graph.first_node_id));
    for node_id in &graph.node_order {
        let label = if graph.is_interrupt(node_id) {
            format!("[{}] (interrupt)", node_id)
        } else {
            node_id.clone()
        };
        let targets = match graph.next_map.get(node_id) {
            Some(NextEntry::Unconditional(to)) => to.clone(),
            Some(NextEntry::Conditional(router)) => {
                let targets = router.targets();
                if targets.is_empty() {
                    "(conditional)".to_string()
                } else {
                    targets.join(" | ")
                }
            }
            None => END.to_string(),
        };
        text.push_str(&format!("  {} -> {}\n", label, targets));
    }
    text
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graph::{GateNode, StateGraph};

    #[test]
    fn test_generate_text() {
        let mut graph = StateGraph::<String>::new().with_interrupt_before(["review"]);
        graph.add_node("write", Arc::new(GateNode::new("write")));
        graph.add_node("review", Arc::new(GateNode::new("review")));
        graph.add_edge(START, "write");
        graph.add_edge("write", "review");
        graph.add_conditional_edges(
            "review",
            Arc::new(|_| "ok".to_string()),
            Some(
                [
                    ("ok".to_string(), END.to_string()),
                    ("no".to_string(), "write".to_string()),
                ]
                .into_iter()
                .collect(),
            ),
        );

        let text = generate_text(&graph.compile().unwrap());
        assert!(text.contains("Nodes: 2"));
        assert!(text.contains("__start__ -> write"));
        assert!(text.contains("write -> review"));
        assert!(text.contains("[review] (interrupt) -> __end__ | write"));
    }
}

//! Conditional edges: route to the next node based on state.
//!
//! A source node has a routing function that takes the current state and
//! returns a key; the key is either used as the next node id or looked up in
//! an optional path map.
//!
//! **Interaction**: Used by `StateGraph::add_conditional_edges` and by
//! `CompiledStateGraph` to resolve the successor of a gate.

use std::collections::HashMap;
use std::sync::Arc;

/// Router function: takes a reference to state and returns a routing key.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Conditional edge definition: routing function plus optional path map.
///
/// - When `path_map` is `None`, the router's return value is the next node id.
/// - When `path_map` is `Some(map)`, the next node id is `map[key]` if present,
///   otherwise the key itself.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S> {
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Resolves the next node id (or END) from the current state.
    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }

    /// Every target the router can name through its path map. Empty without a map.
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self
            .path_map
            .as_ref()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        targets.sort();
        targets.dedup();
        targets
    }
}

/// How to determine the next node after a given node runs.
#[derive(Clone)]
pub enum NextEntry<S> {
    /// Single fixed next node (or END). The node's `Next` is still respected.
    Unconditional(String),
    /// Next node is decided by the router from state; the node's `Next` is ignored.
    Conditional(ConditionalRouter<S>),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: a key present in the path map resolves to the mapped node; others pass through.
    #[test]
    fn resolve_next_uses_path_map_then_key() {
        let router: ConditionalRouter<bool> = ConditionalRouter::new(
            Arc::new(|ok: &bool| if *ok { "yes".into() } else { "other".into() }),
            Some([("yes".to_string(), "forward".to_string())].into_iter().collect()),
        );
        assert_eq!(router.resolve_next(&true), "forward");
        assert_eq!(router.resolve_next(&false), "other");
        assert_eq!(router.targets(), vec!["forward".to_string()]);
    }
}

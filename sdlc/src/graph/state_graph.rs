//! State graph: nodes + explicit edges (from → to) and conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using
//! `START` and `END` for graph entry/exit, route on state with
//! `add_conditional_edges`, and mark human approval points with
//! `with_interrupt_before`. Then `compile` or `compile_with_checkpointer`.
//!
//! # Conditional edges
//!
//! From a source node, a routing function `(state) -> key` is called; the key is
//! used as the next node id, or looked up in an optional path map. A node must have
//! either one outgoing `add_edge` or `add_conditional_edges`, not both. Unlike a
//! plain chain, conditional edges may point backwards, so cycles are allowed.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;
use crate::graph::retry::RetryPolicy;
use crate::memory::Checkpointer;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// State graph: nodes plus explicit edges, conditional edges and interrupt points.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Node ids in the order they were added; used for rendering.
    node_order: Vec<String>,
    /// Edges (from_id, to_id). A node may have one outgoing edge or conditional_edges, not both.
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    /// `advance` halts before any node in this set.
    interrupt_before: Vec<String>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    /// Retry policy for node execution. Default is `RetryPolicy::None`.
    retry_policy: RetryPolicy,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            interrupt_before: Vec::new(),
            middleware: None,
            retry_policy: RetryPolicy::None,
        }
    }

    /// Attaches node middleware. Chain with `compile()`: `graph.with_middleware(m).compile()?`.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Attaches a retry policy for node execution. Default is `RetryPolicy::None`.
    pub fn with_retry_policy(self, retry_policy: RetryPolicy) -> Self {
        Self {
            retry_policy,
            ..self
        }
    }

    /// Marks nodes that `advance` must halt before. Each id must be added via
    /// `add_node` before `compile()`.
    pub fn with_interrupt_before<I, T>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut interrupt_before = self.interrupt_before;
        interrupt_before.extend(ids.into_iter().map(Into::into));
        Self {
            interrupt_before,
            ..self
        }
    }

    /// Adds a node; id must be unique. Replaces if same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        let id = id.into();
        if !self.nodes.contains_key(&id) {
            self.node_order.push(id.clone());
        }
        self.nodes.insert(id, node);
        self
    }

    /// Adds an edge from `from_id` to `to_id`. Use `START` and `END` for entry and exit.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `source`: after it runs (or after `update_state`
    /// as it), `path(state)` picks the next node, mapped through `path_map` when given.
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Builds the executable graph without persistence; only `invoke` is usable.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with a checkpointer; enables `advance`,
    /// `update_state`, `get_state` and `history`.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(ref path_map) = router.path_map {
                for target in path_map.values() {
                    if target != END && !self.nodes.contains_key(target) {
                        return Err(CompilationError::InvalidConditionalPathMap(target.clone()));
                    }
                }
            }
        }
        for id in &self.interrupt_before {
            if !self.nodes.contains_key(id) {
                return Err(CompilationError::InterruptNodeNotFound(id.clone()));
            }
        }

        let start_edges: Vec<&String> = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t)
            .collect();
        let first = match start_edges.as_slice() {
            [] => return Err(CompilationError::MissingStart),
            [only] => (*only).clone(),
            _ => {
                return Err(CompilationError::InvalidChain(
                    "multiple edges from START (branch)".into(),
                ))
            }
        };

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let mut edge_froms = HashSet::new();
        for (from, _) in self.edges.iter().filter(|(f, _)| f.as_str() != START) {
            if !edge_froms.insert(from.clone()) {
                return Err(CompilationError::InvalidChain(format!(
                    "duplicate edge from {} (branch)",
                    from
                )));
            }
        }
        for source in self.conditional_edges.keys() {
            if edge_froms.contains(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(
                    source.clone(),
                ));
            }
        }

        let mut next_map: HashMap<String, NextEntry<S>> = self
            .edges
            .iter()
            .filter(|(f, _)| f.as_str() != START)
            .map(|(f, t)| (f.clone(), NextEntry::Unconditional(t.clone())))
            .collect();
        for (source, router) in self.conditional_edges {
            next_map.insert(source, NextEntry::Conditional(router));
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            node_order: self.node_order,
            first_node_id: first,
            next_map,
            interrupt_before: self.interrupt_before.into_iter().collect(),
            checkpointer,
            middleware: self.middleware,
            retry_policy: self.retry_policy,
        })
    }
}

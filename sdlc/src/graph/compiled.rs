//! Compiled state graph: immutable; runs straight through (`invoke`) or step by
//! step over a checkpointed thread (`advance` / `update_state`).
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. With a
//! checkpointer, every node completion writes a checkpoint holding the new state
//! and the cursor (next node). `advance` halts whenever the cursor names an
//! `interrupt_before` node, and the caller resumes by `update_state(.., as_node, ..)`
//! followed by another `advance`.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::AgentError;
use crate::memory::{
    Checkpoint, CheckpointListItem, CheckpointSource, Checkpointer, RunnableConfig,
};

use super::logging;
use super::node_middleware::NodeMiddleware;
use super::retry::RetryPolicy;
use super::run_error::RunError;
use super::state_graph::END;
use super::{Next, NextEntry, Node};

/// Maximum node executions in one `invoke`; denial loops that never approve stop here.
pub const RECURSION_LIMIT: usize = 100;

/// One executed node and the state it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutput<S> {
    pub node: String,
    pub state: S,
}

/// Why an `advance` call returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Halted before the named interrupt node; resolve it to continue.
    Interrupted { before: String },
    /// Cursor reached END.
    Completed,
}

impl RunStatus {
    /// The gate the run is halted before, if any.
    pub fn interrupted_before(&self) -> Option<&str> {
        match self {
            RunStatus::Interrupted { before } => Some(before),
            RunStatus::Completed => None,
        }
    }
}

/// Result of one `advance` call: nodes executed in this call, in order, plus
/// where the run stopped and the latest state.
#[derive(Debug, Clone)]
pub struct AdvanceOutcome<S> {
    pub events: Vec<NodeOutput<S>>,
    pub status: RunStatus,
    pub state: S,
}

/// Current view of a thread: latest state and cursor.
#[derive(Debug, Clone)]
pub struct StateSnapshot<S> {
    pub values: S,
    /// Node to run next (or gate halted before). `None` = completed.
    pub next: Option<String>,
    pub checkpoint_id: String,
    pub step: i64,
    pub created_at: String,
}

/// Compiled graph: immutable structure.
///
/// **Interaction**: Created by `StateGraph::compile*`; driven by `SdlcRunner`.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) node_order: Vec<String>,
    pub(super) first_node_id: String,
    /// Map from node id to how to get next: Unconditional(to_id) or Conditional(router).
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) interrupt_before: HashSet<String>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    pub(super) retry_policy: RetryPolicy,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node ids in the order they were added.
    pub fn node_ids(&self) -> &[String] {
        &self.node_order
    }

    pub fn first_node_id(&self) -> &str {
        &self.first_node_id
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// True when `advance` halts before `id`.
    pub fn is_interrupt(&self, id: &str) -> bool {
        self.interrupt_before.contains(id)
    }

    fn checkpointer(&self) -> Result<&Arc<dyn Checkpointer<S>>, RunError> {
        self.checkpointer
            .as_ref()
            .ok_or(RunError::CheckpointerRequired)
    }

    fn thread_label(config: &RunnableConfig) -> String {
        config.thread_id.clone().unwrap_or_default()
    }

    fn node(&self, id: &str) -> Result<Arc<dyn Node<S>>, AgentError> {
        self.nodes
            .get(id)
            .cloned()
            .ok_or_else(|| AgentError::ExecutionFailed(format!("unknown node: {}", id)))
    }

    /// Execute a node with middleware and retry.
    async fn execute_node_with_retry(
        &self,
        node: Arc<dyn Node<S>>,
        state: S,
    ) -> Result<(S, Next), AgentError> {
        let mut failures = 0;
        loop {
            let current_state = state.clone();
            let result = if let Some(middleware) = &self.middleware {
                let node_id = node.id().to_string();
                let node_clone = node.clone();
                middleware
                    .around_run(
                        &node_id,
                        current_state,
                        Box::new(move |s| Box::pin(async move { node_clone.run(s).await })),
                    )
                    .await
            } else {
                node.run(current_state).await
            };

            match result {
                Ok(output) => return Ok(output),
                Err(e) if self.retry_policy.should_retry(failures + 1) => {
                    failures += 1;
                    tracing::warn!(node_id = node.id(), failures, error = %e, "retrying node");
                    let interval = self.retry_policy.interval();
                    if !interval.is_zero() {
                        tokio::time::sleep(interval).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Next node after `current_id` given the state it produced. `None` = END.
    fn resolve_next(
        &self,
        current_id: &str,
        state: &S,
        next: Next,
    ) -> Result<Option<String>, AgentError> {
        let target = match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => {
                let target = router.resolve_next(state);
                tracing::debug!(from = %current_id, to = %target, "conditional routing");
                Some(target)
            }
            Some(NextEntry::Unconditional(to)) => match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => Some(to.clone()),
            },
            None => match next {
                Next::Node(id) => Some(id),
                Next::Continue | Next::End => None,
            },
        };
        match target {
            None => Ok(None),
            Some(id) if id == END => Ok(None),
            Some(id) if self.nodes.contains_key(&id) => Ok(Some(id)),
            Some(id) => Err(AgentError::ExecutionFailed(format!(
                "{} routed to unknown node: {}",
                current_id, id
            ))),
        }
    }

    /// Runs the graph from the first node to END without checkpoints. Interrupt
    /// points are ignored: gates pass through and route on whatever status the
    /// state already carries.
    pub async fn invoke(&self, state: S) -> Result<S, RunError> {
        let mut state = state;
        let mut cursor = Some(self.first_node_id.clone());
        let mut steps = 0;
        logging::run_started("-");
        while let Some(current_id) = cursor {
            if steps >= RECURSION_LIMIT {
                let err = AgentError::ExecutionFailed(format!(
                    "recursion limit of {} reached at {}",
                    RECURSION_LIMIT, current_id
                ));
                logging::node_failed(&current_id, &err);
                return Err(err.into());
            }
            let node = self.node(&current_id)?;
            logging::node_started(&current_id, &state);
            let (new_state, next) = match self.execute_node_with_retry(node, state).await {
                Ok(output) => output,
                Err(e) => {
                    logging::node_failed(&current_id, &e);
                    return Err(e.into());
                }
            };
            logging::node_finished(&current_id, &next);
            cursor = self.resolve_next(&current_id, &new_state, next)?;
            state = new_state;
            steps += 1;
        }
        logging::run_completed("-");
        Ok(state)
    }

    /// Drives the thread forward until it halts before an interrupt node or completes.
    ///
    /// - `Some(state)`: seeds a new checkpoint with the first node as cursor.
    /// - `None`: resumes from the thread's latest checkpoint (`ThreadNotFound` if none).
    ///
    /// Halting is checked before executing, so calling this again on a halted
    /// thread returns immediately with no events. On a node error the latest
    /// checkpoint still points at the failing node and the call can be retried.
    pub async fn advance(
        &self,
        config: &RunnableConfig,
        input: Option<S>,
    ) -> Result<AdvanceOutcome<S>, RunError> {
        let checkpointer = self.checkpointer()?;
        let (mut state, mut cursor, mut step) = match input {
            Some(state) => {
                let step = match checkpointer.get_tuple(config).await? {
                    Some((_, metadata)) => metadata.step + 1,
                    None => -1,
                };
                let cursor = Some(self.first_node_id.clone());
                let checkpoint =
                    Checkpoint::new(state.clone(), cursor.clone(), CheckpointSource::Input, step);
                checkpointer.put(config, &checkpoint).await?;
                (state, cursor, step)
            }
            None => {
                let (checkpoint, metadata) = checkpointer
                    .get_tuple(config)
                    .await?
                    .ok_or_else(|| RunError::ThreadNotFound(Self::thread_label(config)))?;
                (checkpoint.state, checkpoint.next, metadata.step)
            }
        };

        let thread = Self::thread_label(config);
        logging::run_started(&thread);
        let mut events = Vec::new();
        loop {
            let Some(current_id) = cursor else {
                logging::run_completed(&thread);
                return Ok(AdvanceOutcome {
                    events,
                    status: RunStatus::Completed,
                    state,
                });
            };
            if self.interrupt_before.contains(&current_id) {
                logging::run_halted(&thread, &current_id);
                return Ok(AdvanceOutcome {
                    events,
                    status: RunStatus::Interrupted { before: current_id },
                    state,
                });
            }

            let node = self.node(&current_id)?;
            logging::node_started(&current_id, &state);
            let (new_state, next) = match self.execute_node_with_retry(node, state.clone()).await {
                Ok(output) => output,
                Err(e) => {
                    logging::node_failed(&current_id, &e);
                    return Err(e.into());
                }
            };
            logging::node_finished(&current_id, &next);

            let next_id = self.resolve_next(&current_id, &new_state, next)?;
            step += 1;
            let checkpoint = Checkpoint::new(
                new_state.clone(),
                next_id.clone(),
                CheckpointSource::Loop,
                step,
            );
            checkpointer.put(config, &checkpoint).await?;
            logging::checkpoint_saved(&current_id, step, next_id.as_deref());

            events.push(NodeOutput {
                node: current_id,
                state: new_state.clone(),
            });
            state = new_state;
            cursor = next_id;
        }
    }

    /// Applies `patch` to the thread's state as though written by `as_node`, then
    /// moves the cursor along `as_node`'s outgoing edge. The node itself is not run.
    ///
    /// The thread must be halted before `as_node` (`NotPausedAt` otherwise).
    /// Returns the new cursor (`None` = END).
    pub async fn update_state<F>(
        &self,
        config: &RunnableConfig,
        as_node: &str,
        patch: F,
    ) -> Result<Option<String>, RunError>
    where
        F: FnOnce(&mut S) + Send,
    {
        if !self.nodes.contains_key(as_node) {
            return Err(RunError::UnknownGate(as_node.to_string()));
        }
        let checkpointer = self.checkpointer()?;
        let (checkpoint, metadata) = checkpointer
            .get_tuple(config)
            .await?
            .ok_or_else(|| RunError::ThreadNotFound(Self::thread_label(config)))?;
        if checkpoint.next.as_deref() != Some(as_node) {
            return Err(RunError::NotPausedAt {
                gate: as_node.to_string(),
                cursor: checkpoint.next,
            });
        }

        let mut state = checkpoint.state;
        patch(&mut state);
        let next_id = self.resolve_next(as_node, &state, Next::Continue)?;
        let update = Checkpoint::new(
            state,
            next_id.clone(),
            CheckpointSource::Update,
            metadata.step + 1,
        );
        checkpointer.put(config, &update).await?;
        logging::checkpoint_saved(as_node, metadata.step + 1, next_id.as_deref());
        Ok(next_id)
    }

    /// Latest state and cursor of the thread; `None` when the thread is unknown.
    pub async fn get_state(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<StateSnapshot<S>>, RunError> {
        let checkpointer = self.checkpointer()?;
        Ok(checkpointer
            .get_tuple(config)
            .await?
            .map(|(checkpoint, metadata)| StateSnapshot {
                values: checkpoint.state,
                next: checkpoint.next,
                checkpoint_id: checkpoint.id,
                step: metadata.step,
                created_at: checkpoint.ts,
            }))
    }

    /// Checkpoints of the thread, oldest first; `limit` keeps the newest `n`.
    pub async fn history(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, RunError> {
        let checkpointer = self.checkpointer()?;
        Ok(checkpointer.list(config, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::graph::{GateNode, StateGraph, START};
    use crate::memory::MemorySaver;

    struct AddNode {
        id: &'static str,
        delta: i32,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Node<i32> for AddNode {
        fn id(&self) -> &str {
            self.id
        }

        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((state + self.delta, Next::Continue))
        }
    }

    struct FailingNode {
        fail_count: Arc<AtomicUsize>,
        max_failures: usize,
    }

    #[async_trait]
    impl Node<i32> for FailingNode {
        fn id(&self) -> &str {
            "failing"
        }

        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            let current = self.fail_count.fetch_add(1, Ordering::SeqCst);
            if current < self.max_failures {
                Err(AgentError::Provider(format!("transient {}", current + 1)))
            } else {
                Ok((state + 10, Next::Continue))
            }
        }
    }

    /// produce (+1) -> gate -> { state >= 10: finish (+100) -> END | else: produce }
    fn gated_graph(calls: Arc<AtomicUsize>) -> StateGraph<i32> {
        let mut graph = StateGraph::<i32>::new().with_interrupt_before(["gate"]);
        graph.add_node(
            "produce",
            Arc::new(AddNode {
                id: "produce",
                delta: 1,
                calls: calls.clone(),
            }),
        );
        graph.add_node("gate", Arc::new(GateNode::new("gate")));
        graph.add_node(
            "finish",
            Arc::new(AddNode {
                id: "finish",
                delta: 100,
                calls,
            }),
        );
        graph.add_edge(START, "produce");
        graph.add_edge("produce", "gate");
        graph.add_conditional_edges(
            "gate",
            Arc::new(|s: &i32| {
                if *s >= 10 {
                    "approve".to_string()
                } else {
                    "deny".to_string()
                }
            }),
            Some(
                [
                    ("approve".to_string(), "finish".to_string()),
                    ("deny".to_string(), "produce".to_string()),
                ]
                .into_iter()
                .collect(),
            ),
        );
        graph.add_edge("finish", END);
        graph
    }

    fn compiled_with_memory(calls: Arc<AtomicUsize>) -> CompiledStateGraph<i32> {
        gated_graph(calls)
            .compile_with_checkpointer(Arc::new(MemorySaver::new()))
            .expect("graph compiles")
    }

    /// **Scenario**: advance runs exactly one node and halts before the gate; a second
    /// advance without input returns immediately with zero events.
    #[tokio::test]
    async fn advance_halts_before_gate_and_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = compiled_with_memory(calls.clone());
        let config = RunnableConfig::for_thread("t1");

        let first = graph.advance(&config, Some(0)).await.unwrap();
        assert_eq!(first.status.interrupted_before(), Some("gate"));
        assert_eq!(first.events.len(), 1);
        assert_eq!(first.events[0].node, "produce");
        assert_eq!(first.state, 1);

        let again = graph.advance(&config, None).await.unwrap();
        assert!(again.events.is_empty());
        assert_eq!(again.status, RunStatus::Interrupted { before: "gate".into() });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// **Scenario**: a denial routes back to the producer, which runs once more and re-halts.
    #[tokio::test]
    async fn update_state_deny_loops_back_to_producer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = compiled_with_memory(calls.clone());
        let config = RunnableConfig::for_thread("t2");
        graph.advance(&config, Some(0)).await.unwrap();

        let routed = graph.update_state(&config, "gate", |_| {}).await.unwrap();
        assert_eq!(routed.as_deref(), Some("produce"));
        let out = graph.advance(&config, None).await.unwrap();
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.status.interrupted_before(), Some("gate"));
        assert_eq!(out.state, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// **Scenario**: approving routes forward and the run completes; advancing a completed
    /// run returns Completed with no events.
    #[tokio::test]
    async fn update_state_approve_completes_run() {
        let graph = compiled_with_memory(Arc::new(AtomicUsize::new(0)));
        let config = RunnableConfig::for_thread("t3");
        graph.advance(&config, Some(0)).await.unwrap();

        graph
            .update_state(&config, "gate", |s| *s = 10)
            .await
            .unwrap();
        let out = graph.advance(&config, None).await.unwrap();
        assert_eq!(out.status, RunStatus::Completed);
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events[0].node, "finish");
        assert_eq!(out.state, 110);

        let done = graph.advance(&config, None).await.unwrap();
        assert_eq!(done.status, RunStatus::Completed);
        assert!(done.events.is_empty());
        let snapshot = graph.get_state(&config).await.unwrap().unwrap();
        assert_eq!(snapshot.next, None);
    }

    /// **Scenario**: resolving a gate the thread is not halted before is rejected and
    /// leaves the checkpoint untouched.
    #[tokio::test]
    async fn update_state_rejects_wrong_gate() {
        let graph = compiled_with_memory(Arc::new(AtomicUsize::new(0)));
        let config = RunnableConfig::for_thread("t4");
        graph.advance(&config, Some(0)).await.unwrap();
        graph.update_state(&config, "gate", |s| *s = 10).await.unwrap();

        let err = graph
            .update_state(&config, "gate", |s| *s = 0)
            .await
            .unwrap_err();
        match err {
            RunError::NotPausedAt { gate, cursor } => {
                assert_eq!(gate, "gate");
                assert_eq!(cursor.as_deref(), Some("finish"));
            }
            e => panic!("expected NotPausedAt, got {:?}", e),
        }
        assert!(matches!(
            graph.update_state(&config, "nope", |_| {}).await,
            Err(RunError::UnknownGate(_))
        ));
        assert_eq!(graph.get_state(&config).await.unwrap().unwrap().values, 10);
    }

    /// **Scenario**: resuming a thread that was never seeded is ThreadNotFound.
    #[tokio::test]
    async fn advance_unknown_thread_is_not_found() {
        let graph = compiled_with_memory(Arc::new(AtomicUsize::new(0)));
        let err = graph
            .advance(&RunnableConfig::for_thread("missing"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::ThreadNotFound(id) if id == "missing"));
    }

    /// **Scenario**: stepwise driving needs a checkpointer.
    #[tokio::test]
    async fn advance_without_checkpointer_fails() {
        let graph = gated_graph(Arc::new(AtomicUsize::new(0))).compile().unwrap();
        let err = graph
            .advance(&RunnableConfig::for_thread("t"), Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::CheckpointerRequired));
    }

    /// **Scenario**: invoke ignores interrupts and routes gates on the state it carries.
    #[tokio::test]
    async fn invoke_passes_through_gates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let graph = gated_graph(calls.clone()).compile().unwrap();
        let out = graph.invoke(9).await.unwrap();
        assert_eq!(out, 110);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// **Scenario**: a denial loop that never approves stops at the recursion limit.
    #[tokio::test]
    async fn invoke_stops_at_recursion_limit() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("gate", Arc::new(GateNode::new("gate")));
        graph.add_edge(START, "gate");
        graph.add_conditional_edges("gate", Arc::new(|_| "gate".to_string()), None);
        let compiled = graph.compile().unwrap();
        let err = compiled.invoke(0).await.unwrap_err();
        assert!(err.to_string().contains("recursion limit"));
    }

    /// **Scenario**: a failing node leaves the cursor on itself; history keeps every write.
    #[tokio::test]
    async fn advance_failure_keeps_cursor_at_failing_node() {
        let fail_count = Arc::new(AtomicUsize::new(0));
        let mut graph = StateGraph::<i32>::new();
        graph.add_node(
            "failing",
            Arc::new(FailingNode {
                fail_count: fail_count.clone(),
                max_failures: 1,
            }),
        );
        graph.add_edge(START, "failing");
        graph.add_edge("failing", END);
        let compiled = graph
            .compile_with_checkpointer(Arc::new(MemorySaver::new()))
            .unwrap();
        let config = RunnableConfig::for_thread("f");

        let err = compiled.advance(&config, Some(0)).await.unwrap_err();
        assert!(matches!(err, RunError::Execution(AgentError::Provider(_))));
        let snapshot = compiled.get_state(&config).await.unwrap().unwrap();
        assert_eq!(snapshot.next.as_deref(), Some("failing"));

        let retried = compiled.advance(&config, None).await.unwrap();
        assert_eq!(retried.status, RunStatus::Completed);
        assert_eq!(retried.state, 10);
        let history = compiled.history(&config, None).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].metadata.source, CheckpointSource::Input);
        assert_eq!(history[1].metadata.source, CheckpointSource::Loop);
    }

    /// **Scenario**: Node with retry policy succeeds after transient failures.
    #[tokio::test]
    async fn invoke_with_retry_succeeds_after_failures() {
        let fail_count = Arc::new(AtomicUsize::new(0));
        let mut graph = StateGraph::<i32>::new()
            .with_retry_policy(RetryPolicy::fixed(3, std::time::Duration::from_millis(1)));
        graph.add_node(
            "failing",
            Arc::new(FailingNode {
                fail_count: fail_count.clone(),
                max_failures: 2,
            }),
        );
        graph.add_edge(START, "failing");
        graph.add_edge("failing", END);

        let result = graph.compile().unwrap().invoke(0).await.unwrap();
        assert_eq!(fail_count.load(Ordering::SeqCst), 3);
        assert_eq!(result, 10);
    }
}

//! SDLC runner: one compiled graph, many threads.
//!
//! `start` seeds a thread and runs to the first gate; `resolve_gate` records a
//! human decision and runs to the next gate (or to the end).

use std::sync::Arc;

use crate::graph::{
    AdvanceOutcome, CompilationError, CompiledStateGraph, RunError, StateSnapshot,
};
use crate::llm::LlmClient;
use crate::memory::{CheckpointListItem, Checkpointer, RunnableConfig};
use crate::stages::StagePrompts;
use crate::state::SdlcState;

use super::build::{build_sdlc_graph, BuildOptions};
use super::gate::{Gate, GatePatch};
use super::progress::{progress, ProgressStep};

/// Drives SDLC runs over a checkpointer. Holds no per-thread state; any
/// number of threads can be driven through the same runner.
pub struct SdlcRunner {
    compiled: CompiledStateGraph<SdlcState>,
}

impl SdlcRunner {
    /// Builds the workflow graph over `checkpointer`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<StagePrompts>,
        checkpointer: Arc<dyn Checkpointer<SdlcState>>,
        options: BuildOptions,
    ) -> Result<Self, CompilationError> {
        let compiled = build_sdlc_graph(llm, prompts, Some(checkpointer), options)?;
        Ok(Self { compiled })
    }

    pub fn graph(&self) -> &CompiledStateGraph<SdlcState> {
        &self.compiled
    }

    /// Seeds `thread_id` with the requirements and runs to the first gate.
    pub async fn start(
        &self,
        thread_id: &str,
        requirements: &str,
    ) -> Result<AdvanceOutcome<SdlcState>, RunError> {
        tracing::info!(thread_id, "starting run");
        self.advance(thread_id, Some(SdlcState::new(requirements)))
            .await
    }

    /// Runs from the thread's cursor (or from a fresh seed) until the next gate or the end.
    pub async fn advance(
        &self,
        thread_id: &str,
        input: Option<SdlcState>,
    ) -> Result<AdvanceOutcome<SdlcState>, RunError> {
        let config = RunnableConfig::for_thread(thread_id);
        let outcome = self.compiled.advance(&config, input).await?;
        tracing::info!(
            thread_id,
            executed = outcome.events.len(),
            halted_before = outcome.status.interrupted_before(),
            "advance finished"
        );
        Ok(outcome)
    }

    /// Applies `patch` at `gate` (node id or alias), routes on the recorded
    /// status and advances. The thread must be halted before that gate.
    pub async fn resolve_gate(
        &self,
        thread_id: &str,
        gate: &str,
        patch: GatePatch,
    ) -> Result<AdvanceOutcome<SdlcState>, RunError> {
        let gate = Gate::parse(gate).ok_or_else(|| RunError::UnknownGate(gate.to_string()))?;
        tracing::info!(
            thread_id,
            gate = gate.node_id(),
            status = patch.status.as_ref().map(|s| s.as_str()),
            "resolving gate"
        );
        let config = RunnableConfig::for_thread(thread_id);
        self.compiled
            .update_state(&config, gate.node_id(), move |state| patch.apply(gate, state))
            .await?;
        self.advance(thread_id, None).await
    }

    pub async fn get_state(
        &self,
        thread_id: &str,
    ) -> Result<Option<StateSnapshot<SdlcState>>, RunError> {
        self.compiled
            .get_state(&RunnableConfig::for_thread(thread_id))
            .await
    }

    /// Checkpoints of the thread, oldest first.
    pub async fn history(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, RunError> {
        self.compiled
            .history(&RunnableConfig::for_thread(thread_id), limit)
            .await
    }

    /// Progress of the thread through the flow; `None` for an unknown thread.
    pub async fn progress(&self, thread_id: &str) -> Result<Option<Vec<ProgressStep>>, RunError> {
        Ok(self
            .get_state(thread_id)
            .await?
            .map(|snapshot| progress(snapshot.next.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::memory::MemorySaver;

    fn runner() -> SdlcRunner {
        SdlcRunner::new(
            Arc::new(MockLlm::new(r#"{"user_stories": ["As a user, I log in"]}"#)),
            Arc::new(StagePrompts::embedded().unwrap()),
            Arc::new(MemorySaver::<SdlcState>::new()),
            BuildOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn unknown_gate_is_rejected() {
        let runner = runner();
        runner.start("t", "Build a login page").await.unwrap();
        let err = runner
            .resolve_gate("t", "Generate Code", GatePatch::approve())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::UnknownGate(ref g) if g == "Generate Code"));
    }

    /// **Scenario**: resolving a gate the thread is not halted at fails and changes nothing.
    #[tokio::test]
    async fn resolving_wrong_gate_leaves_thread_in_place() {
        let runner = runner();
        runner.start("t", "Build a login page").await.unwrap();
        let err = runner
            .resolve_gate("t", "design", GatePatch::approve())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::NotPausedAt { .. }));
        let snapshot = runner.get_state("t").await.unwrap().unwrap();
        assert_eq!(snapshot.next.as_deref(), Some(Gate::UserStoryApproval.node_id()));
    }

    #[tokio::test]
    async fn progress_of_unknown_thread_is_none() {
        assert!(runner().progress("missing").await.unwrap().is_none());
    }
}

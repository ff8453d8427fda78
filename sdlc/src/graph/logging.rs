//! `tracing` events emitted while a graph runs. Run-level events carry the
//! thread id (`-` for unpersisted `invoke` runs); node-level events carry the node id.

use std::fmt::Debug;

use crate::error::AgentError;
use crate::graph::Next;

pub fn run_started(thread: &str) {
    tracing::info!(thread, "run started");
}

/// Full state goes out at `trace` only; it carries generated code.
pub fn node_started<S: Debug>(node_id: &str, state: &S) {
    tracing::debug!(node_id, "node started");
    tracing::trace!(node_id, ?state, "node input");
}

pub fn node_finished(node_id: &str, next: &Next) {
    tracing::debug!(node_id, ?next, "node finished");
}

pub fn node_failed(node_id: &str, error: &AgentError) {
    tracing::error!(node_id, %error, "node failed");
}

pub fn checkpoint_saved(node_id: &str, step: i64, next: Option<&str>) {
    tracing::debug!(node_id, step, next = next.unwrap_or("END"), "checkpoint saved");
}

pub fn run_halted(thread: &str, before: &str) {
    tracing::info!(thread, before, "run halted before gate");
}

pub fn run_completed(thread: &str) {
    tracing::info!(thread, "run completed");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: every event helper is callable with no subscriber-specific setup.
    #[test]
    fn events_do_not_panic() {
        run_started("t1");
        node_started("Generate Code", &vec!["state"]);
        node_finished("Generate Code", &Next::Continue);
        node_failed("Generate Code", &AgentError::ExecutionFailed("boom".into()));
        checkpoint_saved("Generate Code", 3, Some("Human Code Review"));
        checkpoint_saved("Deployment", 13, None);
        run_halted("t1", "Human Code Review");
        run_completed("t1");
    }
}

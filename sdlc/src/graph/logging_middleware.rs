//! Logging middleware that reports node enter/exit around each node.run call.
//!
//! The CLI attaches it with `--verbose`.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Instant;

use crate::error::AgentError;
use crate::graph::Next;

use super::node_middleware::{NodeMiddleware, NodeRunFn};

/// Middleware that logs node enter/exit (with elapsed time) at `info`.
///
/// Generic over state type `S`; only node_id is logged.
pub struct LoggingNodeMiddleware<S> {
    _phantom: std::marker::PhantomData<S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRunFn<S>,
    ) -> Result<(S, Next), AgentError> {
        tracing::info!(node = node_id, "enter");
        let started = Instant::now();
        let result = inner(state).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok((_, next)) => tracing::info!(node = node_id, ?next, elapsed_ms, "exit"),
            Err(e) => tracing::warn!(node = node_id, error = %e, elapsed_ms, "exit with error"),
        }
        result
    }
}

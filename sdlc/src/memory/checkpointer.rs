//! Checkpointer trait and CheckpointError.
//!
//! Saves and loads checkpoints by (thread_id, checkpoint_ns). The latest
//! checkpoint of a thread is its current (state, cursor).

use async_trait::async_trait;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata};
use crate::memory::config::RunnableConfig;

/// Error type for checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
}

/// Persists checkpoints per thread.
///
/// Implementations: `MemorySaver` (in-process), `SqliteSaver` (file-backed).
///
/// **Interaction**: Injected via `StateGraph::compile_with_checkpointer`;
/// `CompiledStateGraph::advance` writes one checkpoint per completed node and
/// `update_state` writes one per gate resolution.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Persist a checkpoint for the thread. Returns the checkpoint id.
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError>;

    /// Load the latest checkpoint for the thread; `None` when the thread is unknown.
    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError>;

    /// Checkpoints of the thread, oldest first. `limit` keeps the newest `n`.
    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;
}

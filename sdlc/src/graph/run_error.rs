//! Run driver error.
//!
//! Returned by `CompiledStateGraph::{advance, update_state, get_state, history}`
//! and by `SdlcRunner`.

use thiserror::Error;

use crate::error::AgentError;
use crate::graph::CompilationError;
use crate::memory::CheckpointError;

/// Error from driving a compiled graph over a checkpointed thread.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("graph compilation failed: {0}")]
    Compilation(#[from] CompilationError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// A node failed. The thread's checkpoint still points at that node.
    #[error("node execution failed: {0}")]
    Execution(#[from] AgentError),

    /// Stepwise operations need a graph compiled with a checkpointer.
    #[error("graph was compiled without a checkpointer")]
    CheckpointerRequired,

    #[error("no checkpoint for thread: {0}")]
    ThreadNotFound(String),

    #[error("unknown gate: {0}")]
    UnknownGate(String),

    /// A gate resolution named a gate the thread is not halted before.
    #[error("thread is not paused at {gate} (cursor: {})", cursor.as_deref().unwrap_or("END"))]
    NotPausedAt {
        gate: String,
        cursor: Option<String>,
    },
}

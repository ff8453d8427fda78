//! Run config: thread id and checkpoint namespace.
//!
//! Passed to `CompiledStateGraph::advance` / `update_state` and to every
//! `Checkpointer` call.

/// Identifies the thread (one independent workflow run) a call operates on.
///
/// **Interaction**: Built by `SdlcRunner` from a thread id string; consumed by
/// `Checkpointer::put` / `get_tuple` / `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnableConfig {
    /// Unique id for this run. Required by every checkpointer call.
    pub thread_id: Option<String>,
    /// Optional namespace for checkpoints. Default is empty.
    pub checkpoint_ns: String,
}

impl RunnableConfig {
    /// Config addressing the given thread in the default namespace.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            checkpoint_ns: String::new(),
        }
    }
}

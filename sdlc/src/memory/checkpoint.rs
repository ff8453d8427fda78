//! Checkpoint and metadata types.
//!
//! A checkpoint is one (state snapshot, cursor) pair for a thread. The cursor
//! `next` names the node that runs next, or the gate the run is paused before;
//! `None` means the run reached END.

use serde::{Deserialize, Serialize};

/// Current version of the checkpoint format.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Where a checkpoint came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointSource {
    /// Seeded from the input state of a new run.
    #[default]
    Input,
    /// Written after a node completed inside the run loop.
    Loop,
    /// Written by an external state update (gate resolution).
    Update,
}

impl CheckpointSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointSource::Input => "Input",
            CheckpointSource::Loop => "Loop",
            CheckpointSource::Update => "Update",
        }
    }

    /// Unknown strings map to `Update`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Input" => CheckpointSource::Input,
            "Loop" => CheckpointSource::Loop,
            _ => CheckpointSource::Update,
        }
    }
}

/// Metadata for a single checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Step number: -1 for the seeded input, then 0, 1, ... per write.
    pub step: i64,
}

/// One checkpoint: state snapshot + cursor + id/ts.
///
/// **Interaction**: Produced by `CompiledStateGraph::advance` and `update_state`;
/// consumed by `Checkpointer::put`, returned by `get_tuple`.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    /// Format version.
    pub v: u32,
    /// Unique id (uuid v4).
    pub id: String,
    /// RFC 3339 creation timestamp.
    pub ts: String,
    /// Graph state at this point.
    pub state: S,
    /// Cursor: node to run next (or gate paused before). `None` = END reached.
    pub next: Option<String>,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    /// Creates a checkpoint for `state` with the given cursor.
    pub fn new(state: S, next: Option<String>, source: CheckpointSource, step: i64) -> Self {
        Self {
            v: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            ts: chrono::Utc::now().to_rfc3339(),
            state,
            next,
            metadata: CheckpointMetadata { source, step },
        }
    }

    /// True when the run this checkpoint belongs to reached END.
    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }
}

/// Item returned by `Checkpointer::list` (run history).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub ts: String,
    pub next: Option<String>,
    pub metadata: CheckpointMetadata,
}

impl<S> From<&Checkpoint<S>> for CheckpointListItem {
    fn from(cp: &Checkpoint<S>) -> Self {
        Self {
            checkpoint_id: cp.id.clone(),
            ts: cp.ts.clone(),
            next: cp.next.clone(),
            metadata: cp.metadata.clone(),
        }
    }
}

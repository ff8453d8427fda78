//! # Memory: checkpointing
//!
//! A [`Checkpointer`] keeps, per thread id, the state snapshot and the cursor
//! (node to run next, or gate the run is paused before). This is what lets a
//! run halt at a human gate and resume in a later call, or a later process.
//!
//! ## Config
//!
//! [`RunnableConfig`] carries the `thread_id` (required) and an optional
//! `checkpoint_ns`.
//!
//! ## Implementations
//!
//! | Type            | Persistence | Use case                  |
//! |-----------------|-------------|---------------------------|
//! | [`MemorySaver`] | In-memory   | Tests, single process     |
//! | [`SqliteSaver`] | SQLite file | CLI, resume across restarts |
//!
//! [`JsonSerializer`] is required for `SqliteSaver` (state must be `Serialize + DeserializeOwned`).

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;
mod sqlite_saver;

pub use checkpoint::{
    Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource, CHECKPOINT_VERSION,
};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::RunnableConfig;
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};
pub use sqlite_saver::SqliteSaver;

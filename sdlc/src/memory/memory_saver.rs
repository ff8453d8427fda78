//! In-memory checkpointer (MemorySaver).
//!
//! Lives for the process lifetime; for tests and single-process runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata};
use crate::memory::checkpointer::{CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;

/// In-memory checkpointer. Key: (thread_id, checkpoint_ns); each thread keeps
/// its checkpoints newest last.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S>>` in `StateGraph::compile_with_checkpointer`.
pub struct MemorySaver<S> {
    inner: Arc<RwLock<HashMap<String, Vec<Checkpoint<S>>>>>,
}

impl<S> MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn thread_key(config: &RunnableConfig) -> Result<String, CheckpointError> {
        let thread_id = config
            .thread_id
            .as_deref()
            .ok_or(CheckpointError::ThreadIdRequired)?;
        Ok(format!("{}:{}", thread_id, config.checkpoint_ns))
    }
}

impl<S> Default for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let key = Self::thread_key(config)?;
        let mut guard = self.inner.write().await;
        guard.entry(key).or_default().push(checkpoint.clone());
        Ok(checkpoint.id.clone())
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let key = Self::thread_key(config)?;
        let guard = self.inner.read().await;
        Ok(guard
            .get(&key)
            .and_then(|list| list.last())
            .map(|cp| (cp.clone(), cp.metadata.clone())))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let key = Self::thread_key(config)?;
        let guard = self.inner.read().await;
        let mut items: Vec<CheckpointListItem> = guard
            .get(&key)
            .map(|list| list.iter().map(CheckpointListItem::from).collect())
            .unwrap_or_default();
        if let Some(n) = limit {
            let len = items.len();
            if len > n {
                items = items.split_off(len - n);
            }
        }
        Ok(items)
    }
}

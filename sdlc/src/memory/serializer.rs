//! Serializer for checkpoint state (state <-> bytes).
//!
//! Used by persistent checkpointers. `MemorySaver` keeps `Checkpoint<S>`
//! values directly and does not need one.

use crate::memory::checkpointer::CheckpointError;

/// Serializes and deserializes state for checkpoint storage.
///
/// **Interaction**: Injected into `SqliteSaver`.
pub trait Serializer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON serializer. Requires `S: Serialize + DeserializeOwned`.
pub struct JsonSerializer;

impl<S> Serializer<S> for JsonSerializer
where
    S: Clone + Send + Sync + 'static + serde::Serialize + serde::de::DeserializeOwned,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(bytes).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

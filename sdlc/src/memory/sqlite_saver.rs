//! SQLite-backed checkpointer (SqliteSaver). Persistent across process restarts.
//!
//! A run paused at a gate can be resumed by a later process that opens the same
//! database file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;

use crate::memory::checkpoint::{
    Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource, CHECKPOINT_VERSION,
};
use crate::memory::checkpointer::{CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;
use crate::memory::serializer::Serializer;

fn storage_err(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

/// SQLite-backed checkpointer. Rows are ordered by insertion (`seq`); the
/// newest row of a (thread_id, checkpoint_ns) pair is the thread's current checkpoint.
///
/// Uses `spawn_blocking` around each rusqlite call.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S>>` in `StateGraph::compile_with_checkpointer`.
pub struct SqliteSaver<S> {
    db_path: PathBuf,
    serializer: Arc<dyn Serializer<S>>,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(
        path: impl AsRef<Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(storage_err)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id TEXT NOT NULL,
                checkpoint_ns TEXT NOT NULL,
                checkpoint_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                payload BLOB NOT NULL,
                next_node TEXT,
                metadata_source TEXT NOT NULL,
                metadata_step INTEGER NOT NULL,
                UNIQUE (thread_id, checkpoint_ns, checkpoint_id)
            )
            "#,
            [],
        )
        .map_err(storage_err)?;
        Ok(Self {
            db_path,
            serializer,
        })
    }

    fn thread_id_required(config: &RunnableConfig) -> Result<String, CheckpointError> {
        config
            .thread_id
            .clone()
            .ok_or(CheckpointError::ThreadIdRequired)
    }
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let thread_id = Self::thread_id_required(config)?;
        let checkpoint_ns = config.checkpoint_ns.clone();
        let payload = self.serializer.serialize(&checkpoint.state)?;
        let id = checkpoint.id.clone();
        let ts = checkpoint.ts.clone();
        let next_node = checkpoint.next.clone();
        let source = checkpoint.metadata.source.as_str();
        let step = checkpoint.metadata.step;

        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage_err)?;
            conn.execute(
                r#"
                INSERT INTO checkpoints
                (thread_id, checkpoint_ns, checkpoint_id, ts, payload, next_node,
                 metadata_source, metadata_step)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![thread_id, checkpoint_ns, id, ts, payload, next_node, source, step],
            )
            .map_err(storage_err)?;
            Ok::<String, CheckpointError>(id)
        })
        .await
        .map_err(storage_err)?
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let thread_id = Self::thread_id_required(config)?;
        let checkpoint_ns = config.checkpoint_ns.clone();
        let db_path = self.db_path.clone();

        type RowData = (String, String, Vec<u8>, Option<String>, String, i64);
        let row: Option<RowData> = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage_err)?;
            let mut stmt = conn
                .prepare(
                    "SELECT checkpoint_id, ts, payload, next_node, metadata_source, metadata_step
                     FROM checkpoints WHERE thread_id = ?1 AND checkpoint_ns = ?2
                     ORDER BY seq DESC LIMIT 1",
                )
                .map_err(storage_err)?;
            let mut rows = stmt
                .query(params![thread_id, checkpoint_ns])
                .map_err(storage_err)?;
            let Some(row) = rows.next().map_err(storage_err)? else {
                return Ok::<_, CheckpointError>(None);
            };
            Ok(Some((
                row.get(0).map_err(storage_err)?,
                row.get(1).map_err(storage_err)?,
                row.get(2).map_err(storage_err)?,
                row.get(3).map_err(storage_err)?,
                row.get(4).map_err(storage_err)?,
                row.get(5).map_err(storage_err)?,
            )))
        })
        .await
        .map_err(storage_err)??;

        let Some((id, ts, payload, next, source, step)) = row else {
            return Ok(None);
        };
        let metadata = CheckpointMetadata {
            source: CheckpointSource::parse(&source),
            step,
        };
        let checkpoint = Checkpoint {
            v: CHECKPOINT_VERSION,
            id,
            ts,
            state: self.serializer.deserialize(&payload)?,
            next,
            metadata: metadata.clone(),
        };
        Ok(Some((checkpoint, metadata)))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let thread_id = Self::thread_id_required(config)?;
        let checkpoint_ns = config.checkpoint_ns.clone();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage_err)?;
            let mut stmt = conn
                .prepare(
                    "SELECT checkpoint_id, ts, next_node, metadata_source, metadata_step
                     FROM checkpoints WHERE thread_id = ?1 AND checkpoint_ns = ?2
                     ORDER BY seq ASC",
                )
                .map_err(storage_err)?;
            let rows = stmt
                .query_map(params![thread_id, checkpoint_ns], |row| {
                    Ok(CheckpointListItem {
                        checkpoint_id: row.get(0)?,
                        ts: row.get(1)?,
                        next: row.get(2)?,
                        metadata: CheckpointMetadata {
                            source: CheckpointSource::parse(&row.get::<_, String>(3)?),
                            step: row.get(4)?,
                        },
                    })
                })
                .map_err(storage_err)?;
            let mut list = rows
                .collect::<Result<Vec<_>, _>>()
                .map_err(storage_err)?;
            if let Some(n) = limit {
                let len = list.len();
                if len > n {
                    list = list.split_off(len - n);
                }
            }
            Ok::<Vec<CheckpointListItem>, CheckpointError>(list)
        })
        .await
        .map_err(storage_err)?
    }
}

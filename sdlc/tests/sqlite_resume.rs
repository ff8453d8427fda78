//! Resuming a halted run from a SQLite checkpoint file in a fresh runner.

mod common;
mod init_logging;

use std::sync::Arc;

use common::*;
use sdlc::memory::CheckpointSource;
use sdlc::workflow::nodes;
use sdlc::{
    Checkpointer, GatePatch, JsonSerializer, MockLlm, RunStatus, RunnableConfig, SdlcState,
    SqliteSaver,
};

fn saver(path: &std::path::Path) -> Arc<SqliteSaver<SdlcState>> {
    Arc::new(SqliteSaver::new(path, Arc::new(JsonSerializer)).unwrap())
}

/// **Scenario**: a run halted by one runner is resolved by another runner that
/// opened the same database file, as a separate process would.
#[tokio::test]
async fn halted_run_resumes_from_another_runner() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("checkpoints.db");

    {
        let llm = Arc::new(MockLlm::new("").with_replies([stories_reply("")]));
        let runner = runner_with(llm, saver(&db));
        let outcome = runner.start("login", REQUIREMENTS).await.unwrap();
        assert_eq!(
            outcome.status.interrupted_before(),
            Some(nodes::USER_STORY_APPROVAL)
        );
    }

    let llm = Arc::new(MockLlm::new("").with_replies([design_reply()]));
    let runner = runner_with(llm.clone(), saver(&db));
    let snapshot = runner.get_state("login").await.unwrap().unwrap();
    assert_eq!(snapshot.values.user_stories.len(), 6);
    assert_eq!(snapshot.next.as_deref(), Some(nodes::USER_STORY_APPROVAL));

    let outcome = runner
        .resolve_gate("login", nodes::USER_STORY_APPROVAL, GatePatch::approve())
        .await
        .unwrap();
    assert_eq!(executed(&outcome), vec![nodes::DESIGN_DOCUMENT]);
    assert_eq!(
        outcome.status,
        RunStatus::Interrupted {
            before: nodes::DESIGN_DOCUMENT_REVIEW.to_string()
        }
    );
    assert_eq!(llm.call_count(), 1);
    assert!(llm.last_prompt_text().unwrap().contains("sign in with email"));
}

/// **Scenario**: history lists the seed, each node step and the gate update in order.
#[tokio::test]
async fn history_records_every_step() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("checkpoints.db");
    let llm = Arc::new(MockLlm::new(design_reply()).with_replies([stories_reply("")]));
    let runner = runner_with(llm, saver(&db));
    runner.start("t1", REQUIREMENTS).await.unwrap();
    runner
        .resolve_gate("t1", "user-stories", GatePatch::approve())
        .await
        .unwrap();

    let history = runner.history("t1", None).await.unwrap();
    let sources: Vec<_> = history.iter().map(|h| h.metadata.source).collect();
    assert_eq!(
        sources,
        vec![
            CheckpointSource::Input,
            CheckpointSource::Loop,
            CheckpointSource::Loop,
            CheckpointSource::Update,
            CheckpointSource::Loop,
        ]
    );
    let steps: Vec<i64> = history.iter().map(|h| h.metadata.step).collect();
    assert_eq!(steps, vec![-1, 0, 1, 2, 3]);
    assert_eq!(
        history.last().and_then(|h| h.next.as_deref()),
        Some(nodes::DESIGN_DOCUMENT_REVIEW)
    );

    let newest = runner.history("t1", Some(2)).await.unwrap();
    assert_eq!(newest.len(), 2);
    assert_eq!(newest[1].checkpoint_id, history[4].checkpoint_id);
}

/// **Scenario**: the saver keeps threads apart and requires a thread id.
#[tokio::test]
async fn saver_scopes_by_thread() {
    let dir = tempfile::tempdir().unwrap();
    let saver = saver(&dir.path().join("c.db"));
    let llm = Arc::new(MockLlm::new(stories_reply("")));
    let runner = runner_with(llm, saver.clone());
    runner.start("a", REQUIREMENTS).await.unwrap();

    assert!(saver
        .get_tuple(&RunnableConfig::for_thread("b"))
        .await
        .unwrap()
        .is_none());
    assert!(saver.get_tuple(&RunnableConfig::default()).await.is_err());
}

//! Library side of the `sdlc` binary: settings resolution, runner wiring and
//! one function per subcommand. Each command returns the text to print so it
//! can be exercised without a terminal.

pub mod display;
pub mod export;
pub mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use config::RunSettings;
use sdlc::{
    AgentError, BuildOptions, CompilationError, GatePatch, JsonSerializer, LlmClient, LlmResponse,
    LoggingNodeMiddleware, Message, NodeMiddleware, PromptLoadError, RetryPolicy, ReviewStatus,
    RunError, SdlcRunner, SdlcState, SqliteSaver, StagePrompts,
};

/// Checkpoint file used when neither the flag, `SDLC_CHECKPOINT_DB` nor the config names one.
pub const DEFAULT_CHECKPOINT_DB: &str = "sdlc-checkpoints.db";

const DEFAULT_RETRY_INTERVAL_MS: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] config::LoadError),
    #[error(transparent)]
    Settings(#[from] sdlc::SettingsError),
    #[error(transparent)]
    Prompts(#[from] PromptLoadError),
    #[error(transparent)]
    Compilation(#[from] CompilationError),
    #[error(transparent)]
    Checkpoint(#[from] sdlc::CheckpointError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("serialize output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no run with thread id {0}")]
    UnknownThread(String),
    #[error("write {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything the runner needs besides the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CliSettings {
    pub checkpoint_db: PathBuf,
    pub prompts_dir: Option<PathBuf>,
    pub retry_policy: RetryPolicy,
    pub verbose: bool,
}

impl CliSettings {
    /// Flag > environment > config file > default, per setting.
    pub fn resolve(
        run: &RunSettings,
        checkpoint_db: Option<PathBuf>,
        retries: Option<usize>,
        verbose: bool,
    ) -> Self {
        let checkpoint_db = checkpoint_db
            .or_else(|| std::env::var_os("SDLC_CHECKPOINT_DB").map(PathBuf::from))
            .or_else(|| run.checkpoint_db.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CHECKPOINT_DB));
        let prompts_dir = std::env::var_os("PROMPTS_DIR")
            .map(PathBuf::from)
            .or_else(|| run.prompts_dir.clone());
        let retry_policy = match retries.or(run.retries) {
            Some(n) if n > 0 => RetryPolicy::fixed(
                n,
                Duration::from_millis(run.retry_interval_ms.unwrap_or(DEFAULT_RETRY_INTERVAL_MS)),
            ),
            _ => RetryPolicy::None,
        };
        Self {
            checkpoint_db,
            prompts_dir,
            retry_policy,
            verbose,
        }
    }
}

/// Provider stand-in for commands that only read checkpoints (`show`,
/// `history`, `graph`, `export`); any stage call fails.
pub struct NoProvider;

#[async_trait]
impl LlmClient for NoProvider {
    async fn invoke(&self, _messages: &[Message]) -> Result<LlmResponse, AgentError> {
        Err(AgentError::Provider(
            "no provider configured for this command".to_string(),
        ))
    }
}

/// Runner over the SQLite checkpoint file with prompts from `prompts_dir` (or embedded).
pub fn build_runner(llm: Arc<dyn LlmClient>, settings: &CliSettings) -> Result<SdlcRunner, CliError> {
    let prompts = StagePrompts::load(settings.prompts_dir.as_deref())?;
    let checkpointer = SqliteSaver::<SdlcState>::new(&settings.checkpoint_db, Arc::new(JsonSerializer))?;
    let middleware: Option<Arc<dyn NodeMiddleware<SdlcState>>> = if settings.verbose {
        Some(Arc::new(LoggingNodeMiddleware::<SdlcState>::default()))
    } else {
        None
    };
    let options = BuildOptions {
        retry_policy: settings.retry_policy.clone(),
        middleware,
    };
    tracing::debug!(db = %settings.checkpoint_db.display(), "checkpoint store opened");
    Ok(SdlcRunner::new(
        llm,
        Arc::new(prompts),
        Arc::new(checkpointer),
        options,
    )?)
}

/// Fresh thread id for `start` without `--thread-id`.
pub fn new_thread_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub async fn start(
    runner: &SdlcRunner,
    thread_id: &str,
    requirements: &str,
) -> Result<String, CliError> {
    let outcome = runner.start(thread_id, requirements).await?;
    Ok(display::format_outcome(thread_id, &outcome))
}

/// Records a decision at `gate`. `status` is stored verbatim; anything other
/// than `Approve`/`Denied` routes as approval.
pub async fn resolve(
    runner: &SdlcRunner,
    thread_id: &str,
    gate: &str,
    status: &str,
    feedback: Option<String>,
) -> Result<String, CliError> {
    let patch = GatePatch::new(Some(ReviewStatus::parse(status.trim())), feedback);
    let outcome = runner.resolve_gate(thread_id, gate, patch).await?;
    Ok(display::format_outcome(thread_id, &outcome))
}

pub async fn show(runner: &SdlcRunner, thread_id: &str, json: bool) -> Result<String, CliError> {
    let snapshot = runner
        .get_state(thread_id)
        .await?
        .ok_or_else(|| CliError::UnknownThread(thread_id.to_string()))?;
    if json {
        let value = serde_json::json!({
            "thread_id": thread_id,
            "next": snapshot.next,
            "step": snapshot.step,
            "checkpoint_id": snapshot.checkpoint_id,
            "created_at": snapshot.created_at,
            "state": snapshot.values,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }
    Ok(display::format_snapshot(thread_id, &snapshot))
}

pub async fn history(
    runner: &SdlcRunner,
    thread_id: &str,
    limit: Option<usize>,
) -> Result<String, CliError> {
    let items = runner.history(thread_id, limit).await?;
    if items.is_empty() {
        return Err(CliError::UnknownThread(thread_id.to_string()));
    }
    Ok(display::format_history(&items))
}

/// Writes the thread's artifacts under `out_dir` and lists what was written.
pub async fn export(runner: &SdlcRunner, thread_id: &str, out_dir: &Path) -> Result<String, CliError> {
    let snapshot = runner
        .get_state(thread_id)
        .await?
        .ok_or_else(|| CliError::UnknownThread(thread_id.to_string()))?;
    let written = export::write_artifacts(&snapshot.values, out_dir)?;
    tracing::info!(thread_id, files = written.len(), "artifacts exported");
    let mut out = format!("Wrote {} file(s) to {}", written.len(), out_dir.display());
    for path in &written {
        out.push_str(&format!("\n  {}", path.display()));
    }
    Ok(out)
}

pub fn graph(runner: &SdlcRunner) -> String {
    sdlc::generate_text(runner.graph())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: an explicit flag beats the config file; zero retries means none.
    #[test]
    fn resolve_prefers_flags() {
        let run = RunSettings {
            checkpoint_db: Some(PathBuf::from("from_config.db")),
            retries: Some(2),
            retry_interval_ms: Some(10),
            ..RunSettings::default()
        };
        let s = CliSettings::resolve(&run, Some(PathBuf::from("flag.db")), None, false);
        assert_eq!(s.checkpoint_db, PathBuf::from("flag.db"));
        assert_eq!(s.retry_policy, RetryPolicy::fixed(2, Duration::from_millis(10)));

        let s = CliSettings::resolve(&run, Some(PathBuf::from("flag.db")), Some(0), true);
        assert_eq!(s.retry_policy, RetryPolicy::None);
        assert!(s.verbose);
    }
}

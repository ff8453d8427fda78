//! # SDLC Gate
//!
//! A human-in-the-loop software-delivery workflow. An LLM drafts each artifact
//! (user stories, design document, code, security review, test cases, QA
//! report) and a human approves or denies it at a gate before the run moves on.
//! Denials loop back to the producing stage with the reviewer's feedback.
//!
//! ## Design
//!
//! - **Single state type**: one [`SdlcState`] per run flows through every node.
//! - **Explicit graph**: [`build_sdlc_graph`] wires stage nodes, gate nodes and
//!   conditional edges into a [`CompiledStateGraph`]; nothing is global.
//! - **Pause = persisted cursor**: every node completion writes a checkpoint
//!   holding the state and the next node. [`SdlcRunner::advance`] stops before a
//!   gate and returns; [`SdlcRunner::resolve_gate`] resumes it, in the same
//!   process or days later in another one ([`SqliteSaver`]).
//! - **Permissive default**: an absent or unrecognized gate status routes as
//!   [`DEFAULT_DECISION`] (approve), with a warning.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`], [`GateNode`],
//!   [`RunError`], middleware and retry.
//! - [`memory`]: [`Checkpointer`], [`MemorySaver`], [`SqliteSaver`], [`RunnableConfig`].
//! - [`llm`]: [`LlmClient`], [`MockLlm`], [`ChatOpenAI`], [`ProviderSettings`], [`ProviderOutput`].
//! - [`state`]: [`SdlcState`], [`DesignDocument`], [`ReviewStatus`].
//! - [`stages`]: one node per processing stage, prompt templates, code and test-case parsers.
//! - [`workflow`]: node ids, [`Gate`], [`GatePatch`], [`decide`], [`SdlcRunner`], progress tracker.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sdlc::{BuildOptions, GatePatch, MemorySaver, MockLlm, SdlcRunner, SdlcState, StagePrompts};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = SdlcRunner::new(
//!     Arc::new(MockLlm::new(r#"{"user_stories": ["As a user, I can sign in"]}"#)),
//!     Arc::new(StagePrompts::embedded()?),
//!     Arc::new(MemorySaver::<SdlcState>::new()),
//!     BuildOptions::default(),
//! )?;
//! let outcome = runner.start("thread-1", "Build a login page").await?;
//! assert_eq!(outcome.status.interrupted_before(), Some("Human User Story Approval"));
//! runner
//!     .resolve_gate("thread-1", "Human User Story Approval", GatePatch::deny("add MFA story"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod stages;
pub mod state;
pub mod workflow;

pub use error::AgentError;
pub use graph::{
    generate_text, AdvanceOutcome, CompilationError, CompiledStateGraph, GateNode,
    LoggingNodeMiddleware, Next, Node, NodeMiddleware, NodeOutput, RetryPolicy, RunError,
    RunStatus, StateGraph, StateSnapshot, END, START,
};
pub use llm::{
    invoke_structured, ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm, ProviderOutput,
    ProviderSettings, SettingsError,
};
pub use memory::{
    CheckpointError, CheckpointListItem, Checkpointer, JsonSerializer, MemorySaver,
    RunnableConfig, SqliteSaver,
};
pub use message::Message;
pub use stages::{
    parse_generated_code, split_test_cases, test_case_file_name, GeneratedFile, PromptLoadError,
    StagePrompts, DEFAULT_CODE_FILENAME,
};
pub use state::{DesignDocument, ReviewStatus, SdlcState};
pub use workflow::{
    build_sdlc_graph, decide, progress, render_progress, BuildOptions, Decision, Gate, GatePatch,
    ProgressStep, SdlcRunner, StepStatus, DEFAULT_DECISION,
};

//! `sdlc` binary: drive SDLC runs from the command line.
//!
//! Subcommands: `start`, `resolve`, `show`, `history`, `export`, `graph`. Runs are
//! checkpointed to SQLite, so each invocation picks up where the thread halted.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cli::{build_runner, logging, CliSettings};
use sdlc::{ChatOpenAI, LlmClient, ProviderSettings};

#[derive(Parser, Debug)]
#[command(name = "sdlc")]
#[command(about = "SDLC Gate: LLM-driven software lifecycle with human approval gates")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Verbose: log node enter/exit and run progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite checkpoint file (default: SDLC_CHECKPOINT_DB or ./sdlc-checkpoints.db)
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    /// Retries per failing stage (0 disables)
    #[arg(long, value_name = "N", global = true)]
    retries: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a run from requirements; stops at the first gate
    Start {
        #[arg(short, long, value_name = "TEXT")]
        requirements: String,
        /// Thread id (default: fresh uuid)
        #[arg(long, value_name = "ID")]
        thread_id: Option<String>,
    },
    /// Record a decision at a gate and continue to the next one
    Resolve {
        #[arg(long, value_name = "ID")]
        thread_id: String,
        /// Gate node id or alias: user-stories, design, code, security, test-cases, qa
        #[arg(long, value_name = "NAME")]
        gate: String,
        /// Approve or Denied
        #[arg(long, value_name = "STATUS")]
        status: String,
        #[arg(long, value_name = "TEXT")]
        feedback: Option<String>,
    },
    /// Show the current state of a thread
    Show {
        #[arg(long, value_name = "ID")]
        thread_id: String,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// List checkpoints of a thread, oldest first
    History {
        #[arg(long, value_name = "ID")]
        thread_id: String,
        /// Only the newest N checkpoints
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Write a thread's artifacts (stories, design, code, test cases) to disk
    Export {
        #[arg(long, value_name = "ID")]
        thread_id: String,
        /// Output directory
        #[arg(long, value_name = "DIR", default_value = cli::export::DEFAULT_EXPORT_DIR)]
        out: PathBuf,
    },
    /// Print the workflow graph
    Graph,
}

impl Command {
    /// Only commands that run stages talk to the provider.
    fn needs_provider(&self) -> bool {
        matches!(self, Command::Start { .. } | Command::Resolve { .. })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let run_settings = config::load_and_apply("sdlc", None)?;
    logging::init(args.verbose);

    let settings = CliSettings::resolve(&run_settings, args.db.clone(), args.retries, args.verbose);
    let llm: Arc<dyn LlmClient> = if args.cmd.needs_provider() {
        Arc::new(ChatOpenAI::from_settings(&ProviderSettings::from_env()?))
    } else {
        Arc::new(cli::NoProvider)
    };
    let runner = build_runner(llm, &settings)?;

    let output = match args.cmd {
        Command::Start {
            requirements,
            thread_id,
        } => {
            let thread_id = thread_id.unwrap_or_else(cli::new_thread_id);
            cli::start(&runner, &thread_id, &requirements).await?
        }
        Command::Resolve {
            thread_id,
            gate,
            status,
            feedback,
        } => cli::resolve(&runner, &thread_id, &gate, &status, feedback).await?,
        Command::Show { thread_id, json } => cli::show(&runner, &thread_id, json).await?,
        Command::History { thread_id, limit } => cli::history(&runner, &thread_id, limit).await?,
        Command::Export { thread_id, out } => cli::export(&runner, &thread_id, &out).await?,
        Command::Graph => cli::graph(&runner),
    };
    println!("{}", output);
    Ok(())
}

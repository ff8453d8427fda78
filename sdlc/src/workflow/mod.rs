//! The SDLC workflow: node ids, gate decisions, graph assembly, the runner and
//! the progress tracker.

mod build;
mod decision;
mod gate;
pub mod nodes;
mod progress;
mod runner;

pub use build::{build_sdlc_graph, BuildOptions};
pub use decision::{decide, Decision, DEFAULT_DECISION};
pub use gate::{Gate, GatePatch};
pub use progress::{progress, render_progress, ProgressStep, StepStatus};
pub use runner::SdlcRunner;

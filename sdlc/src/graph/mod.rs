//! State graph: nodes, edges, conditional edges and interrupt points; compile,
//! then either `invoke` straight through or `advance` a checkpointed thread
//! gate by gate.

mod compile_error;
mod compiled;
mod conditional;
mod gate_node;
mod logging;
mod logging_middleware;
mod next;
mod node;
mod node_middleware;
mod retry;
mod run_error;
mod state_graph;
mod visualization;

pub use compile_error::CompilationError;
pub use compiled::{
    AdvanceOutcome, CompiledStateGraph, NodeOutput, RunStatus, StateSnapshot, RECURSION_LIMIT,
};
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use gate_node::GateNode;
pub use logging_middleware::LoggingNodeMiddleware;
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeMiddleware, NodeRunFn};
pub use retry::RetryPolicy;
pub use run_error::RunError;
pub use state_graph::{StateGraph, END, START};
pub use visualization::generate_text;

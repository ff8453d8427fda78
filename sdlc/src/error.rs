//! Node execution error types.
//!
//! Returned by `Node::run` for every stage in the workflow graph and by
//! `LlmClient::invoke` for provider failures.

use thiserror::Error;

/// Stage execution error.
///
/// A failing node aborts the current `advance` call; the checkpoint for the
/// thread stays at the last consistent state so the call can be retried.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A required input field written by an earlier stage is absent or empty.
    #[error("missing precondition: {0} is empty")]
    MissingPrecondition(String),

    /// The capability provider (LLM) call failed: transport, auth, rate limit.
    #[error("provider error: {0}")]
    Provider(String),

    /// Execution failed for any other reason (e.g. unknown node at runtime).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

impl AgentError {
    /// Builds a `MissingPrecondition` naming the field.
    pub fn missing(field: impl Into<String>) -> Self {
        AgentError::MissingPrecondition(field.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: MissingPrecondition names the field in its Display output.
    #[test]
    fn missing_precondition_display_names_field() {
        let err = AgentError::missing("requirements");
        let s = err.to_string();
        assert!(s.contains("missing precondition"), "{}", s);
        assert!(s.contains("requirements"), "{}", s);
    }

    /// **Scenario**: Provider and ExecutionFailed keep their messages.
    #[test]
    fn provider_and_execution_failed_display() {
        assert!(AgentError::Provider("rate limited".into())
            .to_string()
            .contains("rate limited"));
        assert!(AgentError::ExecutionFailed("boom".into())
            .to_string()
            .contains("execution failed"));
    }
}

//! Decision functions: read a gate's status from state and pick a route.
//!
//! A missing status and any value other than `Approve`/`Denied` route as
//! [`DEFAULT_DECISION`]. Unrecognized values are logged at `warn` since a
//! malformed human input silently approves.

use crate::state::ReviewStatus;

/// Route out of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Denied,
}

impl Decision {
    /// Routing key used in the gates' path maps.
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approve => "Approve",
            Decision::Denied => "Denied",
        }
    }
}

/// Applied when a gate's status is absent or unrecognized.
pub const DEFAULT_DECISION: Decision = Decision::Approve;

pub fn decide(status: &Option<ReviewStatus>) -> Decision {
    match status {
        Some(ReviewStatus::Approve) => Decision::Approve,
        Some(ReviewStatus::Denied) => Decision::Denied,
        None => DEFAULT_DECISION,
        Some(ReviewStatus::Unrecognized(raw)) => {
            tracing::warn!(
                status = %raw,
                default = DEFAULT_DECISION.as_str(),
                "unrecognized review status, routing with default decision"
            );
            DEFAULT_DECISION
        }
    }
}

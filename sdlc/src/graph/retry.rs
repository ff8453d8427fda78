//! How often a failing stage is re-run before the error reaches the caller.
//!
//! Provider failures propagate unless a policy is attached with
//! `StateGraph::with_retry_policy`. The state a stage sees on a retry is the
//! same state it saw on the first try.

use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// First failure is final.
    #[default]
    None,
    /// Up to `retries` extra runs, `interval` apart.
    Fixed { retries: usize, interval: Duration },
}

impl RetryPolicy {
    pub fn fixed(retries: usize, interval: Duration) -> Self {
        RetryPolicy::Fixed { retries, interval }
    }

    /// Whether another run is allowed after `failures` failed runs.
    pub fn should_retry(&self, failures: usize) -> bool {
        match self {
            RetryPolicy::None => false,
            RetryPolicy::Fixed { retries, .. } => failures <= *retries,
        }
    }

    pub fn interval(&self) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { interval, .. } => *interval,
        }
    }
}

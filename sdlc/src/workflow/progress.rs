//! Progress tracker: where a run's cursor sits in the flow.

use std::fmt;

use super::nodes::FLOW_ORDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    InProgress,
    NotStarted,
}

impl StepStatus {
    pub fn icon(self) -> &'static str {
        match self {
            StepStatus::Completed => "✅",
            StepStatus::InProgress => "⌛",
            StepStatus::NotStarted => "⚪",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressStep {
    pub label: &'static str,
    pub status: StepStatus,
}

impl fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.icon(), self.label)
    }
}

/// Status of every step for a cursor. Steps before the cursor are completed,
/// the cursor's step is in progress; `None` (run finished) completes all.
/// A cursor outside the flow counts as the first step.
pub fn progress(cursor: Option<&str>) -> Vec<ProgressStep> {
    let current = match cursor {
        None => FLOW_ORDER.len(),
        Some(id) => FLOW_ORDER.iter().position(|step| *step == id).unwrap_or(0),
    };
    FLOW_ORDER
        .iter()
        .enumerate()
        .map(|(i, label)| ProgressStep {
            label,
            status: if i < current {
                StepStatus::Completed
            } else if i == current && cursor.is_some() {
                StepStatus::InProgress
            } else {
                StepStatus::NotStarted
            },
        })
        .collect()
}

/// One line: `✅ A → ⌛ B → ⚪ C`.
pub fn render_progress(steps: &[ProgressStep]) -> String {
    steps
        .iter()
        .map(ProgressStep::to_string)
        .collect::<Vec<_>>()
        .join(" → ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::nodes;

    #[test]
    fn halted_at_gate_marks_earlier_steps_done() {
        let steps = progress(Some(nodes::USER_STORY_APPROVAL));
        assert_eq!(steps.len(), 14);
        assert_eq!(steps[1].status, StepStatus::Completed);
        assert_eq!(steps[2].status, StepStatus::InProgress);
        assert_eq!(steps[3].status, StepStatus::NotStarted);
        assert!(render_progress(&steps[..4]).starts_with(
            "✅ User Requirements → ✅ Auto-generate User Stories → ⌛ Human User Story Approval → ⚪"
        ));
    }

    #[test]
    fn completed_run_marks_every_step() {
        assert!(progress(None)
            .iter()
            .all(|s| s.status == StepStatus::Completed));
    }
}

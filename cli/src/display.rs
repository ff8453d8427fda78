//! Text rendering of runs for stdout: what ran, where the run halted, and the
//! artifact waiting for review at that gate.

use sdlc::{
    parse_generated_code, render_progress, split_test_cases, test_case_file_name,
    AdvanceOutcome, CheckpointListItem, Gate, RunStatus, SdlcState, StateSnapshot,
};

/// Max chars of a single artifact line.
const MAX_LINE: usize = 160;

/// Truncates a string to at most `max` chars; appends "..." when truncated. UTF-8 safe.
pub(crate) fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    if max <= SUFFIX.len() {
        return s.chars().take(max).collect();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    format!(
        "{}{}",
        s.chars().take(max - SUFFIX.len()).collect::<String>(),
        SUFFIX
    )
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, s)| format!("  {}. {}", i + 1, truncate_display(s, MAX_LINE)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The artifact a reviewer decides on at `gate`.
pub fn gate_artifact(gate: Gate, state: &SdlcState) -> String {
    match gate {
        Gate::UserStoryApproval => format!("User stories:\n{}", numbered(&state.user_stories)),
        Gate::DesignDocumentReview => {
            format!("Design document:\n{}", state.design_document.to_markdown().trim_end())
        }
        Gate::CodeReview => {
            let files = parse_generated_code(&state.code);
            let lines: Vec<String> = files
                .iter()
                .map(|f| format!("  {} ({} lines)", f.filename, f.content.lines().count()))
                .collect();
            format!("Generated files:\n{}", lines.join("\n"))
        }
        Gate::SecurityReview => format!(
            "Security review ({}):\n  {}",
            state
                .security_review_status
                .as_ref()
                .map(|s| s.as_str())
                .unwrap_or("no verdict"),
            truncate_display(state.security_review_feedback.trim(), MAX_LINE * 4)
        ),
        Gate::TestCasesReview => {
            let names: Vec<String> = split_test_cases(&state.test_cases)
                .iter()
                .enumerate()
                .map(|(i, block)| test_case_file_name(block, i))
                .collect();
            format!("Test cases:\n{}", numbered(&names))
        }
        Gate::QaReview => format!("QA findings:\n{}", numbered(&state.qa_review_feedback)),
    }
}

/// Summary of one `advance` / `resolve` call.
pub fn format_outcome(thread_id: &str, outcome: &AdvanceOutcome<SdlcState>) -> String {
    let mut out = format!("Thread: {}\n", thread_id);
    let ran: Vec<&str> = outcome.events.iter().map(|e| e.node.as_str()).collect();
    if ran.is_empty() {
        out.push_str("Executed: (nothing)\n");
    } else {
        out.push_str(&format!("Executed: {}\n", ran.join(", ")));
    }
    match &outcome.status {
        RunStatus::Interrupted { before } => {
            out.push_str(&format!("Waiting for: {}\n", before));
            if let Some(gate) = Gate::parse(before) {
                out.push('\n');
                out.push_str(&gate_artifact(gate, &outcome.state));
                out.push('\n');
            }
        }
        RunStatus::Completed => {
            out.push_str(&format!("Completed: {}\n", outcome.state.deployment));
        }
    }
    out
}

/// `sdlc show` text: cursor, progress and the pending artifact.
pub fn format_snapshot(thread_id: &str, snapshot: &StateSnapshot<SdlcState>) -> String {
    let mut out = format!(
        "Thread: {}\nStep: {} ({})\nNext: {}\n",
        thread_id,
        snapshot.step,
        snapshot.created_at,
        snapshot.next.as_deref().unwrap_or("END")
    );
    out.push_str(&format!(
        "Progress: {}\n",
        render_progress(&sdlc::progress(snapshot.next.as_deref()))
    ));
    if let Some(gate) = snapshot.next.as_deref().and_then(Gate::parse) {
        out.push('\n');
        out.push_str(&gate_artifact(gate, &snapshot.values));
        out.push('\n');
    }
    out
}

/// One line per checkpoint, oldest first.
pub fn format_history(items: &[CheckpointListItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "{:>4}  {:<6}  {:<32}  {}  {}",
                item.metadata.step,
                item.metadata.source.as_str(),
                item.next.as_deref().unwrap_or("END"),
                item.ts,
                item.checkpoint_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_display_is_char_safe() {
        assert_eq!(truncate_display("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_display("short", 10), "short");
    }

    #[test]
    fn code_gate_lists_parsed_files() {
        let mut state = SdlcState::new("x");
        state.code = "Filename: api.py\n```python\na\nb\n```".into();
        assert_eq!(
            gate_artifact(Gate::CodeReview, &state),
            "Generated files:\n  api.py (2 lines)"
        );
    }

    #[test]
    fn test_case_gate_lists_names() {
        let mut state = SdlcState::new("x");
        state.test_cases = "[Test Case Name]: Valid login\n---\n[Test Case Name]: Bad pwd".into();
        assert_eq!(
            gate_artifact(Gate::TestCasesReview, &state),
            "Test cases:\n  1. Valid_login\n  2. Bad_pwd"
        );
    }
}

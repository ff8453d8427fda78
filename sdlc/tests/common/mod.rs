//! Shared fixtures: canned provider replies per stage and runner builders.

#![allow(dead_code)]

use std::sync::Arc;

use sdlc::{
    AdvanceOutcome, BuildOptions, Checkpointer, MemorySaver, MockLlm, SdlcRunner, SdlcState,
    StagePrompts,
};

pub const REQUIREMENTS: &str = "Build a login page";

pub fn stories_reply(extra: &str) -> String {
    let mut stories: Vec<String> = vec![
        "As a user, I want to sign in with email and password so that I can access my account",
        "As a user, I want to reset my password so that I can recover access",
        "As an admin, I want to lock accounts so that abuse is stopped",
        "As a guest, I want to see a sign-up link so that I can register",
        "As a user, I want to stay signed in so that I do not re-enter credentials",
        "As an admin, I want to see failed login attempts so that I can audit",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    if !extra.is_empty() {
        stories[5] = extra.to_string();
    }
    serde_json::json!({ "user_stories": stories }).to_string()
}

pub fn design_reply() -> String {
    serde_json::json!({
        "functional": ["Login form with email and password", "Password reset by email"],
        "technical": ["Flask REST API", "PostgreSQL users table"],
        "assumptions": ["Email delivery is available"],
        "open_questions": ["SSO support?"]
    })
    .to_string()
}

pub fn code_reply(version: u32) -> String {
    format!(
        "Filename: models.py\nCode:\n```python\nclass User:\n    version = {v}\n```\n\n\
         Filename: api.py\nCode:\n```python\ndef login():\n    return {v}\n```\n",
        v = version
    )
}

pub fn security_reply(status: &str, review: &str) -> String {
    serde_json::json!({ "status": status, "review": review }).to_string()
}

pub fn test_cases_reply() -> String {
    "[Test Case Name]: Valid login\n[Test Type]: Unit\n---\n\
     [Test Case Name]: Wrong password\n[Test Type]: Negative\n---\n\
     [Test Case Name]: Locked account\n[Test Type]: Integration"
        .to_string()
}

pub fn qa_reply(status: &str, finding: &str) -> String {
    serde_json::json!({ "status": status, "feedback": [finding] }).to_string()
}

/// Replies for one pass through every provider-backed stage, in call order.
pub fn straight_through_replies() -> Vec<String> {
    vec![
        stories_reply(""),
        design_reply(),
        code_reply(1),
        security_reply("Approve", "No critical findings."),
        test_cases_reply(),
        qa_reply("Approve", "All cases passed"),
    ]
}

pub fn runner_with(
    llm: Arc<MockLlm>,
    checkpointer: Arc<dyn Checkpointer<SdlcState>>,
) -> SdlcRunner {
    SdlcRunner::new(
        llm,
        Arc::new(StagePrompts::embedded().unwrap()),
        checkpointer,
        BuildOptions::default(),
    )
    .unwrap()
}

pub fn memory_runner(llm: Arc<MockLlm>) -> SdlcRunner {
    runner_with(llm, Arc::new(MemorySaver::<SdlcState>::new()))
}

/// Node ids executed in an outcome, in order.
pub fn executed(outcome: &AdvanceOutcome<SdlcState>) -> Vec<String> {
    outcome.events.iter().map(|e| e.node.clone()).collect()
}

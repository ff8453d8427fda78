//! Stage prompt templates.
//!
//! Default text lives in `sdlc/prompts/stages.yaml`, embedded at compile time.
//! A `stages.yaml` in `PROMPTS_DIR` (or `./prompts`) replaces it as a whole.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::message::Message;

const EMBEDDED_STAGES: &str = include_str!("../../prompts/stages.yaml");

const STAGES_FILE: &str = "stages.yaml";

/// Default directory name when `PROMPTS_DIR` is not set.
const DEFAULT_PROMPTS_DIR: &str = "prompts";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("valid placeholder regex"));

/// Error when loading prompts from a directory (unreadable file, invalid YAML).
#[derive(Debug, thiserror::Error)]
pub enum PromptLoadError {
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
}

/// One stage's templates: system instructions, the user message, and the
/// text appended to the user message on re-entry after a denial.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StagePrompt {
    pub system: String,
    pub user: String,
    pub revision: String,
}

impl StagePrompt {
    /// Builds `[system, user]` with placeholders filled from `vars`.
    pub fn messages(&self, vars: &[(&str, &str)]) -> Vec<Message> {
        vec![
            Message::system(self.system.trim_end()),
            Message::user(render(&self.user, vars).trim_end()),
        ]
    }

    /// Like [`messages`](Self::messages) with the revision text appended to the user message.
    pub fn revision_messages(&self, vars: &[(&str, &str)]) -> Vec<Message> {
        let user = format!(
            "{}\n\n{}",
            render(&self.user, vars).trim_end(),
            render(&self.revision, vars).trim_end()
        );
        vec![Message::system(self.system.trim_end()), Message::user(user)]
    }
}

/// All stage templates.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StagePrompts {
    pub user_stories: StagePrompt,
    pub design_document: StagePrompt,
    pub code_generate: StagePrompt,
    pub code_after_code_review: StagePrompt,
    pub code_after_security_review: StagePrompt,
    pub code_after_qa_review: StagePrompt,
    pub security_review: StagePrompt,
    pub test_cases: StagePrompt,
    pub qa_testing: StagePrompt,
}

/// Replaces `{name}` with the matching value; unknown names are left as-is.
/// Values are inserted verbatim (braces inside them are not expanded).
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let lookup: HashMap<&str, &str> = vars.iter().copied().collect();
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            lookup
                .get(&caps[1])
                .map(|v| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn prompts_dir(dir: Option<&Path>) -> PathBuf {
    dir.map(PathBuf::from).unwrap_or_else(|| {
        std::env::var("PROMPTS_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_DIR))
    })
}

impl StagePrompts {
    /// Parses the embedded default templates.
    pub fn embedded() -> Result<Self, PromptLoadError> {
        serde_yaml::from_str(EMBEDDED_STAGES).map_err(|e| PromptLoadError::ParseYaml {
            path: "<embedded stages.yaml>".to_string(),
            message: e.to_string(),
        })
    }

    /// Loads `stages.yaml` from `dir` (or `PROMPTS_DIR`, or `./prompts`); falls
    /// back to the embedded templates when the file does not exist.
    pub fn load(dir: Option<&Path>) -> Result<Self, PromptLoadError> {
        let path = prompts_dir(dir).join(STAGES_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::embedded(),
            Err(e) => {
                return Err(PromptLoadError::ReadFile {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        };
        tracing::debug!(path = %path.display(), "loading stage prompts");
        serde_yaml::from_str(&content).map_err(|e| PromptLoadError::ParseYaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

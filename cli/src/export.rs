//! `sdlc export`: writes a thread's artifacts under one directory.
//!
//! Layout: `user_stories.txt`, `design_document.md`, `generated_code/<file>`
//! and `test_cases/<name>.txt`. Artifacts the run has not produced yet are
//! skipped. Existing files are overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use sdlc::{parse_generated_code, split_test_cases, test_case_file_name, SdlcState};

use crate::CliError;

/// Default output directory of `sdlc export`.
pub const DEFAULT_EXPORT_DIR: &str = "artifacts";

fn write(path: PathBuf, contents: &str, written: &mut Vec<PathBuf>) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CliError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, contents).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "artifact written");
    written.push(path);
    Ok(())
}

fn user_stories_text(stories: &[String]) -> String {
    let mut out = format!("User Stories\n{}\n\n", "=".repeat(40));
    for (i, story) in stories.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, story));
    }
    out
}

/// Writes every produced artifact of `state` under `out_dir`; returns the paths written.
///
/// Code file names come from [`parse_generated_code`], which only accepts
/// bare names, so nothing lands outside `generated_code/`.
pub fn write_artifacts(state: &SdlcState, out_dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut written = Vec::new();
    if !state.user_stories.is_empty() {
        write(
            out_dir.join("user_stories.txt"),
            &user_stories_text(&state.user_stories),
            &mut written,
        )?;
    }
    if !state.design_document.is_empty() {
        let markdown = format!("# Design Document\n\n{}", state.design_document.to_markdown());
        write(out_dir.join("design_document.md"), &markdown, &mut written)?;
    }
    for file in parse_generated_code(&state.code) {
        let mut content = file.content;
        content.push('\n');
        write(
            out_dir.join("generated_code").join(&file.filename),
            &content,
            &mut written,
        )?;
    }
    for (i, block) in split_test_cases(&state.test_cases).iter().enumerate() {
        let name = format!("{}.txt", test_case_file_name(block, i));
        write(out_dir.join("test_cases").join(name), block, &mut written)?;
    }
    Ok(written)
}

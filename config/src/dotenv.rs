//! Project `.env` (in `override_dir` or the current directory), read with the
//! `dotenv` crate without touching the process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = override_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())?;
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Key-value pairs of the `.env` file; a missing file is an empty map.
pub(crate) fn load_env_map(override_dir: Option<&Path>) -> Result<HashMap<String, String>, LoadError> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok(HashMap::new());
    };
    let dotenv_err = |e: dotenv::Error| LoadError::Dotenv {
        path: path.clone(),
        message: e.to_string(),
    };
    dotenv::from_path_iter(&path)
        .map_err(dotenv_err)?
        .map(|item| item.map_err(dotenv_err))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());
    }

    /// **Scenario**: comments are skipped and quoted values unquoted.
    #[test]
    fn reads_pairs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "# provider\nOPENAI_API_KEY=sk-test\nMODEL=\"gpt-4o-mini\"\nTEMPERATURE=0.2\n",
        )
        .unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m.get("OPENAI_API_KEY").map(String::as_str), Some("sk-test"));
        assert_eq!(m.get("MODEL").map(String::as_str), Some("gpt-4o-mini"));
        assert_eq!(m.len(), 3);
    }
}

//! `$XDG_CONFIG_HOME/<app>/config.toml`: an `[env]` table of provider settings
//! and a `[run]` table of workflow settings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LoadError;

/// Workflow settings from the `[run]` table. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// SQLite checkpoint file.
    pub checkpoint_db: Option<PathBuf>,
    /// Directory holding a `stages.yaml` prompt override.
    pub prompts_dir: Option<PathBuf>,
    /// Extra attempts for a failing stage (0 or absent = fail immediately).
    pub retries: Option<usize>,
    pub retry_interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    pub(crate) env: HashMap<String, String>,
    #[serde(default)]
    pub(crate) run: RunSettings,
}

/// `$XDG_CONFIG_HOME`, falling back to the platform config dir.
pub(crate) fn config_home() -> Result<PathBuf, LoadError> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .ok_or_else(|| LoadError::ConfigPath("no config directory for this platform".into()))
}

/// Parses `<config_home>/<app_name>/config.toml`; a missing file is an empty config.
pub(crate) fn load_file(config_home: &Path, app_name: &str) -> Result<ConfigFile, LoadError> {
    let path = config_home.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(ConfigFile::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| LoadError::ReadFile {
        path: path.clone(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, app: &str, body: &str) {
        let app_dir = dir.join(app);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join("config.toml"), body).unwrap();
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = load_file(dir.path(), "sdlc").unwrap();
        assert!(file.env.is_empty());
        assert_eq!(file.run, RunSettings::default());
    }

    /// **Scenario**: both tables are read; unknown tables are ignored.
    #[test]
    fn reads_env_and_run_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "sdlc",
            r#"
[env]
MODEL = "gpt-4o"

[run]
checkpoint_db = "/var/lib/sdlc/runs.db"
retries = 3

[other]
key = "ignored"
"#,
        );
        let file = load_file(dir.path(), "sdlc").unwrap();
        assert_eq!(file.env.get("MODEL").map(String::as_str), Some("gpt-4o"));
        assert_eq!(
            file.run.checkpoint_db.as_deref(),
            Some(Path::new("/var/lib/sdlc/runs.db"))
        );
        assert_eq!(file.run.retries, Some(3));
        assert_eq!(file.run.prompts_dir, None);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "sdlc", "not valid toml [[[\n");
        assert!(matches!(
            load_file(dir.path(), "sdlc"),
            Err(LoadError::ParseToml(_))
        ));
    }
}

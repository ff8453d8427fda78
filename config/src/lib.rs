//! Configuration for the `sdlc` CLI.
//!
//! Provider settings are plain environment variables (`OPENAI_API_KEY`,
//! `MODEL`, `TEMPERATURE`, ...). They may also come from a project `.env` or from
//! the `[env]` table of `$XDG_CONFIG_HOME/<app>/config.toml`, with priority
//! **existing env > .env > XDG**. The same file's `[run]` table holds workflow
//! settings ([`RunSettings`]).

mod dotenv;
mod xdg_toml;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use xdg_toml::RunSettings;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("config path: {0}")]
    ConfigPath(String),
    #[error("read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config toml: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("read {}: {message}", path.display())]
    Dotenv { path: PathBuf, message: String },
}

/// Loads `.env` and the XDG config file, sets every key that is not already in
/// the process environment, and returns the `[run]` settings.
///
/// * `app_name`: directory under `$XDG_CONFIG_HOME`, e.g. `"sdlc"`.
/// * `override_dir`: look for `.env` here instead of the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<RunSettings, LoadError> {
    let config_home = xdg_toml::config_home()?;
    load_and_apply_from(&config_home, app_name, override_dir)
}

/// [`load_and_apply`] with an explicit config home.
pub fn load_and_apply_from(
    config_home: &Path,
    app_name: &str,
    override_dir: Option<&Path>,
) -> Result<RunSettings, LoadError> {
    let file = xdg_toml::load_file(config_home, app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir)?;

    let keys: HashSet<&String> = file.env.keys().chain(dotenv_map.keys()).collect();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(value) = dotenv_map.get(key).or_else(|| file.env.get(key)) {
            std::env::set_var(key, value);
        }
    }
    Ok(file.run)
}

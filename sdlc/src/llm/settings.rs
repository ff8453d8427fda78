//! Provider settings read from the environment.
//!
//! Keys: `OPENAI_API_KEY`, `OPENAI_BASE_URL` (or `OPENAI_API_BASE`), `MODEL`,
//! `TEMPERATURE`, `TOP_P`, `MAX_TOKENS`, `SYSTEM_PROMPT`. The `config` crate
//! fills the environment from `.env` and `config.toml` before these are read.

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// A setting that is present but does not parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Sampling and connection settings for [`ChatOpenAI`](super::ChatOpenAI).
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: String,
    /// `None` or `0.0` means greedy sampling.
    pub temperature: Option<f32>,
    /// Only sent with a non-zero temperature.
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Prepended to every request when non-empty.
    pub system_prompt: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

fn parse_opt<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, SettingsError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| SettingsError::Invalid {
                key: key.to_string(),
                value: raw,
            }),
    }
}

impl ProviderSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup` (key -> value). Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let temperature: Option<f32> = parse_opt(&lookup, "TEMPERATURE")?;
        if let Some(t) = temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(SettingsError::Invalid {
                    key: "TEMPERATURE".into(),
                    value: t.to_string(),
                });
            }
        }
        let top_p: Option<f32> = parse_opt(&lookup, "TOP_P")?;
        if let Some(p) = top_p {
            if !(0.0..=1.0).contains(&p) {
                return Err(SettingsError::Invalid {
                    key: "TOP_P".into(),
                    value: p.to_string(),
                });
            }
        }
        Ok(Self {
            api_key: non_empty("OPENAI_API_KEY"),
            api_base: non_empty("OPENAI_BASE_URL").or_else(|| non_empty("OPENAI_API_BASE")),
            model: non_empty("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            top_p,
            max_tokens: parse_opt(&lookup, "MAX_TOKENS")?,
            system_prompt: lookup("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }

    /// True when the provider should decode greedily (no sampling parameters).
    pub fn is_greedy(&self) -> bool {
        self.temperature.map_or(true, |t| t == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    /// **Scenario**: nothing set yields the defaults and greedy sampling.
    #[test]
    fn empty_environment_uses_defaults() {
        let settings = ProviderSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, ProviderSettings::default());
        assert!(settings.is_greedy());
    }

    /// **Scenario**: every key is read; OPENAI_BASE_URL wins over OPENAI_API_BASE.
    #[test]
    fn reads_all_keys() {
        let settings = ProviderSettings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("OPENAI_API_BASE", "http://ignored"),
            ("MODEL", "llama3"),
            ("TEMPERATURE", "0.7"),
            ("TOP_P", "0.9"),
            ("MAX_TOKENS", "2048"),
            ("SYSTEM_PROMPT", "Be terse."),
        ]))
        .unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.api_base.as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.temperature, Some(0.7));
        assert_eq!(settings.top_p, Some(0.9));
        assert_eq!(settings.max_tokens, Some(2048));
        assert_eq!(settings.system_prompt, "Be terse.");
        assert!(!settings.is_greedy());
    }

    /// **Scenario**: unparsable or out-of-range numbers are rejected with the key named.
    #[test]
    fn invalid_numbers_are_rejected() {
        let err = ProviderSettings::from_lookup(lookup(&[("MAX_TOKENS", "lots")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::Invalid {
                key: "MAX_TOKENS".into(),
                value: "lots".into()
            }
        );
        let err = ProviderSettings::from_lookup(lookup(&[("TEMPERATURE", "3")])).unwrap_err();
        assert!(err.to_string().contains("TEMPERATURE"));
    }
}

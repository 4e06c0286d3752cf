use std::{fs, io, path::Path, time::Duration};

use serde::Deserialize;
use shared::error::SettingsError;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "alternation.toml";
pub const DEFAULT_TRANSITION_DURATION_MILLISECONDS: u64 = 1000;

const ENV_FORGET_STATE: &str = "APP__FORGET_STATE_ON_TRANSITION";
const ENV_TRANSITION_DURATION: &str = "APP__TRANSITION_DURATION_MILLISECONDS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlternationOptions {
    pub forget_state_on_transition: bool,
    pub transition_duration_milliseconds: u64,
}

impl Default for AlternationOptions {
    fn default() -> Self {
        Self {
            forget_state_on_transition: false,
            transition_duration_milliseconds: DEFAULT_TRANSITION_DURATION_MILLISECONDS,
        }
    }
}

impl AlternationOptions {
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_milliseconds)
    }
}

pub fn load_settings() -> AlternationOptions {
    match load_settings_from(DEFAULT_SETTINGS_FILE) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(error = %err, "config: using default alternation settings");
            AlternationOptions::default()
        }
    }
}

/// A missing file yields defaults; environment overrides are applied on top.
pub fn load_settings_from(path: impl AsRef<Path>) -> Result<AlternationOptions, SettingsError> {
    let path = path.as_ref();
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => parse_settings(path, &raw)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => AlternationOptions::default(),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn parse_settings(path: &Path, raw: &str) -> Result<AlternationOptions, SettingsError> {
    toml::from_str::<AlternationOptions>(raw).map_err(|err| SettingsError::Parse {
        path: path.to_path_buf(),
        message: err.message().to_string(),
    })
}

fn apply_env_overrides(
    settings: &mut AlternationOptions,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), SettingsError> {
    if let Some(v) = lookup(ENV_FORGET_STATE) {
        settings.forget_state_on_transition =
            parse_flag(&v).ok_or_else(|| SettingsError::InvalidEnv {
                key: ENV_FORGET_STATE,
                value: v.clone(),
                expected: "a boolean (true/false, 1/0, yes/no)",
            })?;
    }

    if let Some(v) = lookup(ENV_TRANSITION_DURATION) {
        settings.transition_duration_milliseconds =
            v.trim()
                .parse::<u64>()
                .map_err(|_| SettingsError::InvalidEnv {
                    key: ENV_TRANSITION_DURATION,
                    value: v.clone(),
                    expected: "a non-negative integer",
                })?;
    }

    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

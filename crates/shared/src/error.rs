use std::path::PathBuf;

use thiserror::Error;

/// Wiring faults in a PRIMARY/SECONDARY pair.
///
/// These are reported by diagnostics only; navigation never checks for them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("no slot is active; the pair has not been bootstrapped or both slots were demoted")]
    NoActiveSlot,
    #[error("both slots report active; the secondary slot was never demoted")]
    BothActive,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file '{path}': {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid value '{value}' for {key}: expected {expected}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

use std::path::PathBuf;
use thiserror::Error;

/// Failures while assembling [`EngineSettings`](super::EngineSettings).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("required settings file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read settings file '{}': {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file '{}': {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    DeserializeError(#[from] toml::de::Error),

    #[error("environment separator must not be empty")]
    EmptySeparator,

    #[error("setting '{field}' must not be empty")]
    EmptyValue { field: &'static str },
}

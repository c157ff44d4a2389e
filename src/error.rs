use std::path::PathBuf;

use thiserror::Error;

use crate::schema::ValidationErrors;
use crate::settings::SettingsError;

/// Terminal failures of the document engine.
///
/// Parse and validation problems are resolved inside the reader; only the
/// outcomes below ever reach a caller. Messages carry field paths and
/// reasons, never field values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config at {} is corrupt and could not be repaired: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("config at {} is invalid and could not be recovered: {errors}", path.display())]
    Unrecoverable {
        path: PathBuf,
        errors: ValidationErrors,
    },

    #[error("failed to write config to {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to write invalid config to {}: {errors}", path.display())]
    Rejected {
        path: PathBuf,
        errors: ValidationErrors,
    },

    #[error("{} is a script config and is never rewritten", path.display())]
    ReadOnlyVariant { path: PathBuf },

    #[error("script config at {} does not match the schema: {errors}", path.display())]
    InvalidScript {
        path: PathBuf,
        errors: ValidationErrors,
    },

    #[error("foreign config at {} cannot be migrated: {reason}", path.display())]
    InvalidForeign { path: PathBuf, reason: String },
}

/// Top-level error type for the projconf library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("config store requires engine settings")]
    MissingSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = ConfigError::Corrupt {
            path: PathBuf::from("/p/.config/rse.jsonc"),
            reason: "syntax error at line 1 column 3".into(),
        };
        assert_eq!(
            err.to_string(),
            "config at /p/.config/rse.jsonc is corrupt and could not be repaired: syntax error at line 1 column 3"
        );
    }

    #[test]
    fn test_config_errors_pass_through_transparently() {
        let err: Error = ConfigError::ReadOnlyVariant {
            path: PathBuf::from("rse.ts"),
        }
        .into();
        assert_eq!(err.to_string(), "rse.ts is a script config and is never rewritten");
    }
}

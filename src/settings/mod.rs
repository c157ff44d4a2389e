//! Engine settings: where config documents live and how the engine behaves.
//!
//! Settings are layered from TOML files and environment variables by
//! [`SettingsLoader`] and deserialized once into [`EngineSettings`].

mod builder;
mod env;
mod error;
mod file;
mod source;

pub use builder::SettingsLoader;
pub use env::EnvSource;
pub use error::SettingsError;
pub use file::FileSource;
pub use source::{SettingsEntry, SettingsSource};

use serde::Deserialize;

/// Names and policies the engine uses when locating documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Reserved subdirectory under the project root.
    pub config_dir: String,
    /// File stem of the primary document (`<stem>.jsonc` / `<stem>.ts`).
    pub file_stem: String,
    /// Directory of secondary documents, inside `config_dir`.
    pub multi_config_dir: String,
    /// Host type-hint file under the project root.
    pub type_hint_file: String,
    /// Whether the resolver may ask which variant to create.
    pub interactive: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            config_dir: ".config".to_string(),
            file_stem: "rse".to_string(),
            multi_config_dir: "mrse".to_string(),
            type_hint_file: "tsconfig.json".to_string(),
            interactive: true,
        }
    }
}

impl EngineSettings {
    /// Rejects blank names, which would make every path collapse onto its parent.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let fields = [
            ("config_dir", &self.config_dir),
            ("file_stem", &self.file_stem),
            ("multi_config_dir", &self.multi_config_dir),
            ("type_hint_file", &self.type_hint_file),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(SettingsError::EmptyValue { field });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineSettings::default().validate().is_ok());
    }

    #[test]
    fn test_blank_stem_is_rejected() {
        let settings = EngineSettings {
            file_stem: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::EmptyValue { field: "file_stem" })
        ));
    }
}

//! TOML file layer for engine settings.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::source::{SettingsEntry, SettingsSource};
use super::SettingsError;

/// Loads one TOML file. Missing optional files contribute nothing.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }
}

impl SettingsSource for FileSource {
    fn entries(&self) -> Result<Vec<SettingsEntry>, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let table = toml::from_str(&contents).map_err(|e| SettingsError::ParseError {
                    path: self.path.clone(),
                    source: e,
                })?;
                debug!(path = %self.path.display(), "Loaded settings file");
                Ok(vec![SettingsEntry::root(table)])
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.required {
                    Err(SettingsError::FileNotFound(self.path.clone()))
                } else {
                    debug!(path = %self.path.display(), "Optional settings file absent");
                    Ok(vec![])
                }
            }
            Err(e) => Err(SettingsError::ReadError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_loads_table_at_root() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "config_dir = \".settings\"").unwrap();

        let entries = FileSource::new(file.path(), true).entries().unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.is_empty());
        let table = entries[0].value.as_table().unwrap();
        assert_eq!(table["config_dir"].as_str(), Some(".settings"));
    }

    #[test]
    fn test_required_missing_file_is_an_error() {
        let result = FileSource::new("/nonexistent/projconf.toml", true).entries();
        assert!(matches!(result, Err(SettingsError::FileNotFound(_))));
    }

    #[test]
    fn test_optional_missing_file_is_skipped() {
        let entries = FileSource::new("/nonexistent/projconf.toml", false)
            .entries()
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_syntax_error_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "config_dir = ").unwrap();

        let result = FileSource::new(file.path(), false).entries();
        assert!(matches!(result, Err(SettingsError::ParseError { .. })));
    }
}

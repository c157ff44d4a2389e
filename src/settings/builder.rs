use std::path::Path;

use serde::de::DeserializeOwned;

use super::env::EnvSource;
use super::file::FileSource;
use super::source::{merge_at_path, SettingsSource};
use super::SettingsError;

/// Builder that layers settings sources and deserializes the result once.
///
/// Sources apply in registration order; later sources override earlier ones.
/// Nested tables merge recursively, everything else is replaced.
///
/// ```no_run
/// use projconf::{EngineSettings, SettingsLoader};
///
/// let settings: EngineSettings = SettingsLoader::new()
///     .with_file("projconf.toml", false)
///     .with_env("PROJCONF", "__")?
///     .build()?;
/// # Ok::<(), projconf::SettingsError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "loaders do nothing until .build() is called"]
pub struct SettingsLoader {
    sources: Vec<Box<dyn SettingsSource>>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML file. A missing file fails the build only if `required`.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds environment variables named `PREFIX<separator>FIELD`.
    pub fn with_env(
        self,
        prefix: impl Into<String>,
        separator: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        Ok(self.with_source(EnvSource::new(prefix, separator)?))
    }

    /// Adds any custom source.
    pub fn with_source(mut self, source: impl SettingsSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn build<T: DeserializeOwned>(self) -> Result<T, SettingsError> {
        let mut merged = toml::Table::new();
        for source in &self.sources {
            for entry in source.entries()? {
                merge_at_path(&mut merged, &entry.path, entry.value);
            }
        }
        toml::Value::Table(merged)
            .try_into()
            .map_err(SettingsError::DeserializeError)
    }
}

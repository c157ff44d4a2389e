//! The explicit handle through which a host drives the engine.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::defaults::{generate_default_document, schema_reference};
use crate::document::{ConfigDocument, ConfigVariant};
use crate::error::ConfigError;
use crate::merge::{deep_merge, merge_with_defaults};
use crate::migrate::{migrate_foreign_config, MigrationReport};
use crate::multi::{load_multi_configs, MultiConfigEntry};
use crate::parse::ParsedText;
use crate::paths::{ConfigLayout, PathResolver, ResolvedConfigPath, VariantPrompt};
use crate::reader::{read_config, ReadMode, ReadOutcome};
use crate::settings::EngineSettings;
use crate::source::source_for;
use crate::write::{update_config, write_config, UpdateOutcome};
use crate::Error;

/// Owns the engine settings, the per-process path cache and the optional
/// variant prompt. Construct one per host process and pass it around.
///
/// ## Example
///
/// ```no_run
/// use projconf::{ConfigStore, EngineSettings};
/// use std::path::Path;
///
/// # async fn run() -> Result<(), projconf::Error> {
/// let store = ConfigStore::builder()
///     .with_settings(EngineSettings::default())
///     .build()?;
///
/// let config = store.load_or_create(Path::new("."), false, &serde_json::json!({})).await?;
/// println!("{:?}", config.get_str("projectName"));
/// # Ok(())
/// # }
/// ```
pub struct ConfigStore {
    resolver: PathResolver,
}

impl ConfigStore {
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder {
            settings: None,
            prompt: None,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        self.resolver.layout().settings()
    }

    pub fn layout(&self) -> &ConfigLayout {
        self.resolver.layout()
    }

    pub async fn resolve_config_path(&self, root: &Path, dev_mode: bool) -> ResolvedConfigPath {
        self.resolver.resolve(root, dev_mode).await
    }

    pub async fn read_config(&self, path: &Path, dev_mode: bool) -> Result<ReadOutcome, ConfigError> {
        read_config(path, dev_mode, ReadMode::Persist).await
    }

    pub async fn write_config(
        &self,
        path: &Path,
        document: &ConfigDocument,
        dev_mode: bool,
    ) -> Result<ConfigDocument, ConfigError> {
        write_config(path, document, dev_mode).await
    }

    /// Loads the secondary documents under the root's multi-config directory.
    pub async fn load_multi_configs(
        &self,
        root: &Path,
        dev_mode: bool,
    ) -> Result<Vec<MultiConfigEntry>, ConfigError> {
        load_multi_configs(&self.layout().multi_config_dir(root), dev_mode).await
    }

    pub async fn migrate_foreign_config(
        &self,
        foreign_path: &Path,
        root: &Path,
        dev_mode: bool,
    ) -> Result<MigrationReport, ConfigError> {
        let resolved = self.resolve_config_path(root, dev_mode).await;
        let fallback = generate_default_document(root, dev_mode).await;
        migrate_foreign_config(foreign_path, &resolved.path, fallback, dev_mode).await
    }

    /// Applies `updates` to the root's document, creating it if needed.
    pub async fn update_config(
        &self,
        root: &Path,
        updates: &Value,
        dev_mode: bool,
    ) -> Result<UpdateOutcome, ConfigError> {
        let resolved = self.resolve_config_path(root, dev_mode).await;
        let fallback = generate_default_document(root, dev_mode).await;
        update_config(&resolved.path, updates, fallback, dev_mode).await
    }

    /// The mandatory load: always yields a document unless the stored one is
    /// unrecoverable.
    ///
    /// A missing structured-text document is generated, merged with
    /// `overrides` and written. Corrupt documents and missing scripts fall
    /// back to in-memory defaults without touching disk.
    pub async fn load_or_create(
        &self,
        root: &Path,
        dev_mode: bool,
        overrides: &Value,
    ) -> Result<ConfigDocument, ConfigError> {
        let resolved = self.resolve_config_path(root, dev_mode).await;
        let path = resolved.path.as_path();

        let mut document = match read_config(path, dev_mode, ReadMode::Persist).await {
            Ok(ReadOutcome::NotFound) => match resolved.variant {
                ConfigVariant::StructuredText => self.create(root, path, dev_mode, overrides).await?,
                ConfigVariant::ScriptDocument => {
                    warn!(path = %path.display(), "script config not found, using defaults");
                    generate_default_document(root, dev_mode).await
                }
            },
            Ok(outcome) => outcome.into_document().unwrap_or_default(),
            Err(ConfigError::Corrupt { path, reason }) => {
                warn!(path = %path.display(), reason = %reason, "config is corrupt, using defaults in memory");
                generate_default_document(root, dev_mode).await
            }
            Err(ConfigError::InvalidScript { path, errors }) => {
                let defaults = generate_default_document(root, dev_mode).await;
                match merge_with_defaults(&self.raw_script(&path).await, &defaults) {
                    Ok(report) => report.document,
                    Err(_) => {
                        warn!(path = %path.display(), errors = %errors, "script config unusable, using defaults");
                        defaults
                    }
                }
            }
            Err(e) => return Err(e),
        };

        if dev_mode {
            document.set("$schema", Value::String(schema_reference(true).to_string()));
        }
        Ok(document)
    }

    async fn create(
        &self,
        root: &Path,
        path: &Path,
        dev_mode: bool,
        overrides: &Value,
    ) -> Result<ConfigDocument, ConfigError> {
        let mut value = generate_default_document(root, dev_mode).await.into_value();
        deep_merge(&mut value, overrides);
        let document = ConfigDocument::from_value(value).unwrap_or_default();

        match write_config(path, &document, dev_mode).await {
            Ok(written) => Ok(written),
            Err(ConfigError::WriteFailed { path, source }) => {
                warn!(path = %path.display(), error = %source, "could not write new config, continuing in memory");
                Ok(document)
            }
            Err(e) => Err(e),
        }
    }

    /// The script's literal as parsed, before validation.
    async fn raw_script(&self, path: &Path) -> Value {
        match source_for(path, ConfigVariant::ScriptDocument).load().await {
            Ok(Some(ParsedText::Parsed(document))) => document.into_value(),
            _ => Value::Null,
        }
    }
}

/// Builder for constructing a [`ConfigStore`].
#[must_use = "builders do nothing until .build() is called"]
pub struct ConfigStoreBuilder {
    settings: Option<EngineSettings>,
    prompt: Option<Arc<dyn VariantPrompt>>,
}

impl ConfigStoreBuilder {
    /// Attaches engine settings, typically from [`SettingsLoader`](crate::SettingsLoader).
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Attaches the prompt used when a fresh TypeScript project could take either variant.
    pub fn with_prompt(mut self, prompt: Arc<dyn VariantPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Builds the store.
    ///
    /// Returns an error if no settings were provided or they are invalid.
    pub fn build(self) -> Result<ConfigStore, Error> {
        let settings = self.settings.ok_or(Error::MissingSettings)?;
        settings.validate()?;
        Ok(ConfigStore {
            resolver: PathResolver::new(ConfigLayout::new(settings), self.prompt),
        })
    }
}

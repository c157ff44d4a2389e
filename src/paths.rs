//! Where a project's config document lives, and in which variant.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::document::ConfigVariant;
use crate::settings::EngineSettings;

/// A config location decided for one project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfigPath {
    pub path: PathBuf,
    pub variant: ConfigVariant,
}

/// Asks the user which variant to create for a fresh TypeScript project.
///
/// Returning `None` falls back to structured text.
#[async_trait]
pub trait VariantPrompt: Send + Sync {
    async fn choose_variant(&self, root: &Path) -> Option<ConfigVariant>;
}

/// File-system layout derived from the engine settings.
#[derive(Debug, Clone)]
pub struct ConfigLayout {
    settings: EngineSettings,
}

impl ConfigLayout {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The reserved subdirectory shared by single and multi-config layouts.
    pub fn config_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.settings.config_dir)
    }

    pub fn primary_path(&self, root: &Path, variant: ConfigVariant) -> PathBuf {
        self.config_dir(root).join(format!(
            "{}.{}",
            self.settings.file_stem,
            variant.extension()
        ))
    }

    pub fn multi_config_dir(&self, root: &Path) -> PathBuf {
        self.config_dir(root).join(&self.settings.multi_config_dir)
    }

    pub fn type_hint_path(&self, root: &Path) -> PathBuf {
        root.join(&self.settings.type_hint_file)
    }
}

/// Resolves and caches config locations per project root.
///
/// A root resolves once per process; later calls return the cached entry even
/// if files appear or disappear in between.
pub struct PathResolver {
    layout: ConfigLayout,
    prompt: Option<Arc<dyn VariantPrompt>>,
    cache: Mutex<HashMap<PathBuf, ResolvedConfigPath>>,
}

impl PathResolver {
    pub fn new(layout: ConfigLayout, prompt: Option<Arc<dyn VariantPrompt>>) -> Self {
        Self {
            layout,
            prompt,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn layout(&self) -> &ConfigLayout {
        &self.layout
    }

    pub async fn resolve(&self, root: &Path, dev_mode: bool) -> ResolvedConfigPath {
        let root = absolute_root(root);
        let root = root.as_path();
        if let Some(hit) = self.cached(root) {
            debug!(root = %root.display(), variant = %hit.variant, "config path cache hit");
            return hit;
        }

        let variant = self.decide(root, dev_mode).await;
        let resolved = ResolvedConfigPath {
            path: self.layout.primary_path(root, variant),
            variant,
        };

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        // a concurrent resolve of the same root may have won; keep its answer
        let entry = cache.entry(root.to_path_buf()).or_insert(resolved).clone();
        debug!(root = %root.display(), path = %entry.path.display(), variant = %entry.variant, "resolved config path");
        entry
    }

    fn cached(&self, root: &Path) -> Option<ResolvedConfigPath> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(root)
            .cloned()
    }

    async fn decide(&self, root: &Path, dev_mode: bool) -> ConfigVariant {
        if dev_mode {
            return ConfigVariant::ScriptDocument;
        }

        let has_type_hint = exists(&self.layout.type_hint_path(root)).await;
        let has_text = exists(&self.layout.primary_path(root, ConfigVariant::StructuredText)).await;
        let has_script = exists(&self.layout.primary_path(root, ConfigVariant::ScriptDocument)).await;

        if has_script {
            return ConfigVariant::ScriptDocument;
        }
        if has_text {
            return ConfigVariant::StructuredText;
        }
        if has_type_hint && self.layout.settings().interactive {
            if let Some(prompt) = &self.prompt {
                if let Some(choice) = prompt.choose_variant(root).await {
                    return choice;
                }
            }
        }
        ConfigVariant::StructuredText
    }
}

/// Errors count as "does not exist".
async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Anchors a relative root at the working directory.
fn absolute_root(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}

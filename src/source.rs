//! Turning a config file on disk into a parsed document, per variant.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::document::ConfigVariant;
use crate::error::ConfigError;
use crate::parse::{self, is_empty_sentinel, ParsedText};

/// A readable config document of one variant.
///
/// `Ok(None)` means the file does not exist. Parse failures surface as
/// [`ConfigError::Corrupt`] and never carry a partial document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn path(&self) -> &Path;

    fn variant(&self) -> ConfigVariant;

    async fn load(&self) -> Result<Option<ParsedText>, ConfigError>;
}

/// Comment-tolerant data file with repair fallback.
#[derive(Debug, Clone)]
pub struct StructuredTextSource {
    path: PathBuf,
}

impl StructuredTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentSource for StructuredTextSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn variant(&self) -> ConfigVariant {
        ConfigVariant::StructuredText
    }

    async fn load(&self) -> Result<Option<ParsedText>, ConfigError> {
        let Some(text) = read_text(&self.path).await? else {
            return Ok(None);
        };
        parse::parse_structured_text(&text)
            .map(Some)
            .map_err(|failure| ConfigError::Corrupt {
                path: self.path.clone(),
                reason: failure.reason,
            })
    }
}

/// Script module whose default export is read as a literal, never executed.
///
/// The file is read afresh on every load so edits between calls are seen.
#[derive(Debug, Clone)]
pub struct ExecutableSource {
    path: PathBuf,
}

impl ExecutableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentSource for ExecutableSource {
    fn path(&self) -> &Path {
        &self.path
    }

    fn variant(&self) -> ConfigVariant {
        ConfigVariant::ScriptDocument
    }

    async fn load(&self) -> Result<Option<ParsedText>, ConfigError> {
        let Some(text) = read_text(&self.path).await? else {
            return Ok(None);
        };
        if is_empty_sentinel(&text) {
            return Ok(Some(ParsedText::Empty));
        }
        parse::parse_script(&text)
            .map(|document| Some(ParsedText::Parsed(document)))
            .map_err(|failure| ConfigError::Corrupt {
                path: self.path.clone(),
                reason: failure.reason,
            })
    }
}

/// Picks the source for a path by its variant.
pub fn source_for(path: &Path, variant: ConfigVariant) -> Box<dyn DocumentSource> {
    match variant {
        ConfigVariant::StructuredText => Box::new(StructuredTextSource::new(path)),
        ConfigVariant::ScriptDocument => Box::new(ExecutableSource::new(path)),
    }
}

async fn read_text(path: &Path) -> Result<Option<String>, ConfigError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found");
            Ok(None)
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_files_load_as_none() {
        let dir = TempDir::new().unwrap();
        for variant in [ConfigVariant::StructuredText, ConfigVariant::ScriptDocument] {
            let source = source_for(&dir.path().join("absent"), variant);
            assert!(source.load().await.unwrap().is_none());
            assert_eq!(source.variant(), variant);
        }
    }

    #[tokio::test]
    async fn test_script_edits_are_seen_on_next_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rse.ts");
        let source = ExecutableSource::new(&path);

        std::fs::write(&path, "export default { projectName: \"one\" };").unwrap();
        let Some(ParsedText::Parsed(first)) = source.load().await.unwrap() else {
            panic!("expected a parsed script");
        };
        std::fs::write(&path, "export default { projectName: \"two\" };").unwrap();
        let Some(ParsedText::Parsed(second)) = source.load().await.unwrap() else {
            panic!("expected a parsed script");
        };

        assert_eq!(first.get_str("projectName"), Some("one"));
        assert_eq!(second.get_str("projectName"), Some("two"));
    }

    #[tokio::test]
    async fn test_corrupt_text_names_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rse.jsonc");
        std::fs::write(&path, "{ invalid").unwrap();

        let err = StructuredTextSource::new(&path).load().await.unwrap_err();
        match err {
            ConfigError::Corrupt { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}

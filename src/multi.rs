//! Secondary documents from the reserved multi-config directory.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::atomic::is_artifact;
use crate::document::{ConfigDocument, ConfigVariant};
use crate::error::ConfigError;
use crate::reader::{read_config, ReadMode};

/// One successfully loaded secondary document.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiConfigEntry {
    pub path: PathBuf,
    pub variant: ConfigVariant,
    pub document: ConfigDocument,
}

/// Lists the candidate member files of `dir`, sorted by name.
///
/// A missing directory has no members.
pub async fn discover_members(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut members = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(source) => {
                return Err(ConfigError::Io {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        };
        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if !is_file || is_artifact(&path) {
            continue;
        }
        if has_member_extension(&path) {
            members.push(path);
        }
    }
    members.sort();
    Ok(members)
}

fn has_member_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            e == ConfigVariant::StructuredText.extension()
                || e == ConfigVariant::ScriptDocument.extension()
        })
}

/// Loads every member of `dir` concurrently, in read-only mode.
///
/// Members that end up corrupt or unrecoverable are skipped with a warning;
/// the rest are returned in file-name order.
pub async fn load_multi_configs(
    dir: &Path,
    dev_mode: bool,
) -> Result<Vec<MultiConfigEntry>, ConfigError> {
    let members = discover_members(dir).await?;
    debug!(dir = %dir.display(), count = members.len(), "discovered multi-config members");

    let loads = members.into_iter().map(|path| async move {
        let outcome = read_config(&path, dev_mode, ReadMode::ReadOnly).await;
        (path, outcome)
    });

    let mut loaded = Vec::new();
    for (path, outcome) in join_all(loads).await {
        match outcome {
            Ok(outcome) => match outcome.into_document() {
                Some(document) => loaded.push(MultiConfigEntry {
                    variant: ConfigVariant::from_path(&path).unwrap_or(ConfigVariant::StructuredText),
                    path,
                    document,
                }),
                None => debug!(path = %path.display(), "multi-config member is empty"),
            },
            Err(e) => warn!(path = %path.display(), error = %e, "skipping multi-config member"),
        }
    }

    info!(dir = %dir.display(), loaded = loaded.len(), "loaded multi-configs");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"{"projectName": "a", "projectAuthor": "ada"}"#;

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = load_multi_configs(&dir.path().join("mrse"), false).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_artifacts_and_foreign_files_are_not_members() {
        let dir = TempDir::new().unwrap();
        for name in ["b.jsonc", "a.ts", "a.jsonc.bak", "a.jsonc.tmp", "notes.md"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.jsonc")).unwrap();

        let members = discover_members(dir.path()).await.unwrap();
        let names: Vec<_> = members
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.ts", "b.jsonc"]);
    }

    #[tokio::test]
    async fn test_broken_member_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("good.jsonc"), VALID).unwrap();
        std::fs::write(dir.path().join("bad.jsonc"), "{ invalid").unwrap();

        let loaded = load_multi_configs(dir.path(), false).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].document.get_str("projectName"), Some("a"));
        assert_eq!(loaded[0].variant, ConfigVariant::StructuredText);
    }

    #[tokio::test]
    async fn test_script_and_text_members_load_together() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("web.jsonc"), VALID).unwrap();
        std::fs::write(
            dir.path().join("api.ts"),
            "import { defineConfig } from \"@reliverse/rse\";\nexport default defineConfig({ projectName: \"api\", projectAuthor: \"ada\" });\n",
        )
        .unwrap();

        let loaded = load_multi_configs(dir.path(), false).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].variant, ConfigVariant::ScriptDocument);
        assert_eq!(loaded[0].document.get_str("projectName"), Some("api"));
        assert_eq!(loaded[1].variant, ConfigVariant::StructuredText);
        assert_eq!(loaded[1].document.get_str("projectName"), Some("a"));
    }

    #[tokio::test]
    async fn test_recovered_members_are_returned_but_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.jsonc");
        std::fs::write(&path, r#"{"projectName": "p", "projectAuthor": 1}"#).unwrap();

        let loaded = load_multi_configs(dir.path(), false).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].document.get_str("projectAuthor"), Some("unknown"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"projectName": "p", "projectAuthor": 1}"#
        );
    }
}

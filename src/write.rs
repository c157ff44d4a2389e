//! The write path: validated, merged when necessary, persisted atomically.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::atomic::atomic_write;
use crate::defaults::default_document;
use crate::document::{ConfigDocument, ConfigVariant};
use crate::error::ConfigError;
use crate::merge::{deep_merge, diff, merge_with_defaults};
use crate::reader::{read_config, ReadMode};
use crate::render::render_document;
use crate::schema;

/// Host-memory fields that never belong in a project document.
const MEMORY_FIELDS: &[&str] = &["code", "key"];

/// Result of [`update_config`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The updates matched what is already stored; nothing was written.
    Unchanged,
    /// No document existed; one was written from the fallback plus updates.
    Created { document: ConfigDocument },
    Updated {
        document: ConfigDocument,
        changes: Vec<String>,
    },
}

fn refuse_script(path: &Path) -> Result<(), ConfigError> {
    match ConfigVariant::from_path(path) {
        Some(ConfigVariant::ScriptDocument) => Err(ConfigError::ReadOnlyVariant {
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

/// Persists `document` to a structured-text path.
///
/// An invalid document is first merged with the defaults; if it is still
/// invalid the write is refused and the file is left untouched. Returns the
/// document actually written.
pub async fn write_config(
    path: &Path,
    document: &ConfigDocument,
    dev_mode: bool,
) -> Result<ConfigDocument, ConfigError> {
    refuse_script(path)?;

    let value = document.to_value();
    let to_write = match schema::validate(&value) {
        Ok(valid) => valid,
        Err(errors) => {
            for e in &errors {
                warn!(path = %path.display(), field = %e.path, reason = %e.message, "invalid field in document to write");
            }
            let report = merge_with_defaults(&value, &default_document(dev_mode)).map_err(
                |errors| ConfigError::Rejected {
                    path: path.to_path_buf(),
                    errors,
                },
            )?;
            for field in &report.defaulted {
                info!(path = %path.display(), field = %field, "filled field from defaults before writing");
            }
            report.document
        }
    };

    atomic_write(path, &render_document(&to_write)).await?;
    Ok(to_write)
}

/// Applies `updates` to the stored document and writes the result if
/// anything changed.
///
/// `null` in `updates` leaves a field as it is. When no document exists yet,
/// `fallback` is used as the base. Invalid results are refused.
pub async fn update_config(
    path: &Path,
    updates: &Value,
    fallback: ConfigDocument,
    dev_mode: bool,
) -> Result<UpdateOutcome, ConfigError> {
    refuse_script(path)?;

    let existing = read_config(path, dev_mode, ReadMode::Persist)
        .await?
        .into_document();
    let created = existing.is_none();
    let current = existing.unwrap_or(fallback).into_value();

    let mut updates = updates.clone();
    if let Value::Object(map) = &mut updates {
        for field in MEMORY_FIELDS {
            map.shift_remove(*field);
        }
    }

    let mut merged = current.clone();
    deep_merge(&mut merged, &updates);
    let document = schema::validate(&merged).map_err(|errors| ConfigError::Rejected {
        path: path.to_path_buf(),
        errors,
    })?;

    let changes = diff(&current, &merged);
    if changes.is_empty() && !created {
        info!(path = %path.display(), "config already up to date");
        return Ok(UpdateOutcome::Unchanged);
    }

    atomic_write(path, &render_document(&document)).await?;
    if created {
        info!(path = %path.display(), "created config");
        return Ok(UpdateOutcome::Created { document });
    }
    info!(path = %path.display(), changed = changes.len(), "updated config");
    Ok(UpdateOutcome::Updated { document, changes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReadOutcome;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip_returns_the_same_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".config/rse.jsonc");
        let doc = default_document(false);

        let written = write_config(&path, &doc, false).await.unwrap();
        assert_eq!(written, doc);
        let outcome = read_config(&path, false, ReadMode::Persist).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Valid(doc));
    }

    #[tokio::test]
    async fn test_invalid_document_is_merged_before_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rse.jsonc");
        let doc = ConfigDocument::from_value(json!({"projectName": "demo", "features": 3})).unwrap();

        let written = write_config(&path, &doc, false).await.unwrap();
        assert_eq!(written.get_str("projectName"), Some("demo"));
        assert!(written.get("features").unwrap().is_object());
    }

    #[tokio::test]
    async fn test_scripts_are_never_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rse.ts");
        let err = write_config(&path, &default_document(true), true).await.unwrap_err();
        assert!(matches!(err, ConfigError::ReadOnlyVariant { .. }));

        let err = update_config(&path, &json!({}), default_document(true), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::ReadOnlyVariant { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_update_reports_changes_and_skips_noops() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rse.jsonc");
        write_config(&path, &default_document(false), false).await.unwrap();

        let outcome = update_config(
            &path,
            &json!({"projectName": "shop", "codeStyle": {"quoteMark": "single"}, "key": "secret", "version": null}),
            default_document(false),
            false,
        )
        .await
        .unwrap();
        let UpdateOutcome::Updated { document, changes } = outcome else {
            panic!("expected an update");
        };
        assert_eq!(changes, vec!["projectName", "codeStyle.quoteMark"]);
        assert!(!document.contains_key("key"));
        assert_eq!(document.get_str("version"), Some("0.1.0"));

        let again = update_config(&path, &json!({"projectName": "shop"}), default_document(false), false)
            .await
            .unwrap();
        assert_eq!(again, UpdateOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_invalid_update_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rse.jsonc");
        write_config(&path, &default_document(false), false).await.unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = update_config(&path, &json!({"deployBehavior": "never"}), default_document(false), false)
            .await
            .unwrap_err();
        match err {
            ConfigError::Rejected { errors, .. } => assert_eq!(errors.paths(), vec!["deployBehavior"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_without_a_file_creates_one() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rse.jsonc");

        let outcome = update_config(&path, &json!({"projectAuthor": "ada"}), default_document(false), false)
            .await
            .unwrap();
        let UpdateOutcome::Created { document } = outcome else {
            panic!("expected creation");
        };
        assert_eq!(document.get_str("projectAuthor"), Some("ada"));
        assert!(path.exists());
    }
}

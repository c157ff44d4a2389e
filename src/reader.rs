//! The read state machine: parse, validate, merge, persist, fall back.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::atomic::{atomic_write, read_backup, restore_backup};
use crate::defaults::default_document;
use crate::document::{ConfigDocument, ConfigVariant};
use crate::error::ConfigError;
use crate::merge::merge_with_defaults;
use crate::parse::{parse_structured_text, ParsedText};
use crate::render::render_document;
use crate::schema::{self, project_schema, prune_unknown, ValidationErrors};
use crate::source::source_for;

/// Whether recovery may touch the file system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadMode {
    /// Recovered documents are written back; a good backup is restored.
    #[default]
    Persist,
    /// Recovery happens in memory only.
    ReadOnly,
}

/// Non-error terminal states of one read.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// No file, or only the empty-document sentinel.
    NotFound,
    Valid(ConfigDocument),
    /// The stored text needed repair or merging with defaults.
    Recovered {
        document: ConfigDocument,
        defaulted: Vec<String>,
        repaired: bool,
        persisted: bool,
    },
    RestoredFromBackup(ConfigDocument),
}

impl ReadOutcome {
    pub fn document(&self) -> Option<&ConfigDocument> {
        match self {
            ReadOutcome::NotFound => None,
            ReadOutcome::Valid(document)
            | ReadOutcome::Recovered { document, .. }
            | ReadOutcome::RestoredFromBackup(document) => Some(document),
        }
    }

    pub fn into_document(self) -> Option<ConfigDocument> {
        match self {
            ReadOutcome::NotFound => None,
            ReadOutcome::Valid(document)
            | ReadOutcome::Recovered { document, .. }
            | ReadOutcome::RestoredFromBackup(document) => Some(document),
        }
    }
}

/// Reads the config at `path`, choosing the variant from its extension.
///
/// Returns `Corrupt` when the text is unparseable even after repair,
/// `Unrecoverable` when neither merging nor the backup yields a valid
/// document, and `InvalidScript` for a script that fails validation.
pub async fn read_config(
    path: &Path,
    dev_mode: bool,
    mode: ReadMode,
) -> Result<ReadOutcome, ConfigError> {
    let variant = ConfigVariant::from_path(path).unwrap_or(ConfigVariant::StructuredText);
    let source = source_for(path, variant);

    let parsed = match source.load().await {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return Ok(ReadOutcome::NotFound),
        Err(e) => {
            if let ConfigError::Corrupt { reason, .. } = &e {
                warn!(path = %path.display(), reason = %reason, "config is corrupt");
            }
            return Err(e);
        }
    };

    let (document, repaired) = match parsed {
        ParsedText::Empty => return Ok(ReadOutcome::NotFound),
        ParsedText::Parsed(document) => (document, false),
        ParsedText::Repaired(document) => (document, true),
    };

    let mut value = document.into_value();
    let pruned = prune_unknown(project_schema(), &mut value);
    for field in &pruned {
        debug!(path = %path.display(), field = %field, "ignoring unknown config field");
    }

    let errors = match schema::validate(&value) {
        Ok(valid) if repaired => {
            return Ok(recovered(path, valid, Vec::new(), true, mode).await);
        }
        Ok(valid) => return Ok(ReadOutcome::Valid(valid)),
        Err(errors) => errors,
    };

    log_validation_errors(path, &errors);
    if !variant.is_writable() {
        return Err(ConfigError::InvalidScript {
            path: path.to_path_buf(),
            errors,
        });
    }

    match merge_with_defaults(&value, &default_document(dev_mode)) {
        Ok(report) => Ok(recovered(path, report.document, report.defaulted, repaired, mode).await),
        Err(remaining) => fall_back_to_backup(path, remaining, mode).await,
    }
}

async fn recovered(
    path: &Path,
    document: ConfigDocument,
    defaulted: Vec<String>,
    repaired: bool,
    mode: ReadMode,
) -> ReadOutcome {
    for field in &defaulted {
        info!(path = %path.display(), field = %field, "config field reset to default");
    }

    let persisted = match mode {
        ReadMode::ReadOnly => false,
        ReadMode::Persist => match atomic_write(path, &render_document(&document)).await {
            Ok(()) => true,
            Err(e) => {
                error!(path = %path.display(), error = %e, "could not persist recovered config");
                false
            }
        },
    };
    info!(path = %path.display(), repaired, persisted, "recovered config");

    ReadOutcome::Recovered {
        document,
        defaulted,
        repaired,
        persisted,
    }
}

async fn fall_back_to_backup(
    path: &Path,
    errors: ValidationErrors,
    mode: ReadMode,
) -> Result<ReadOutcome, ConfigError> {
    if let Some(document) = usable_backup(path).await {
        warn!(path = %path.display(), "config unusable, falling back to backup");
        if mode == ReadMode::Persist {
            restore_backup(path).await?;
        }
        return Ok(ReadOutcome::RestoredFromBackup(document));
    }

    error!(path = %path.display(), errors = %errors, "config is unrecoverable");
    Err(ConfigError::Unrecoverable {
        path: path.to_path_buf(),
        errors,
    })
}

async fn usable_backup(path: &Path) -> Option<ConfigDocument> {
    let text = read_backup(path).await?;
    let document = match parse_structured_text(&text) {
        Ok(ParsedText::Parsed(document) | ParsedText::Repaired(document)) => document,
        _ => return None,
    };
    let mut value: Value = document.into_value();
    prune_unknown(project_schema(), &mut value);
    schema::validate(&value).ok()
}

fn log_validation_errors(path: &Path, errors: &ValidationErrors) {
    for e in errors {
        warn!(path = %path.display(), field = %e.path, reason = %e.message, "config field is invalid");
    }
}

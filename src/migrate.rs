//! One-shot transfer of allow-listed fields from a foreign document.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::document::{ConfigDocument, ConfigVariant};
use crate::error::ConfigError;
use crate::parse::ParsedText;
use crate::source::source_for;
use crate::write::{update_config, UpdateOutcome};

/// Fields that may be carried over from another project's document.
///
/// Identity fields (`projectName`, `projectAuthor`, ...) stay local.
pub const MIGRATABLE_FIELDS: &[&str] = &[
    "projectDescription",
    "version",
    "projectLicense",
    "projectRepository",
    "projectCategory",
    "projectSubcategory",
    "projectFramework",
    "projectTemplate",
    "projectArchitecture",
    "deployBehavior",
    "depsBehavior",
    "gitBehavior",
    "i18nBehavior",
    "scriptsBehavior",
    "existingRepoBehavior",
    "repoPrivacy",
    "features",
    "preferredLibraries",
    "codeStyle",
    "monorepo",
    "ignoreDependencies",
    "customRules",
    "skipPromptsUseAutoBehavior",
    "relinterConfirm",
];

/// What a migration transferred.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    /// Allow-listed fields found in the foreign document.
    pub migrated: Vec<String>,
    pub outcome: UpdateOutcome,
}

/// Migrates [`MIGRATABLE_FIELDS`] from `foreign_path` into `local_path`.
pub async fn migrate_foreign_config(
    foreign_path: &Path,
    local_path: &Path,
    fallback: ConfigDocument,
    dev_mode: bool,
) -> Result<MigrationReport, ConfigError> {
    migrate_fields(foreign_path, local_path, MIGRATABLE_FIELDS, fallback, dev_mode).await
}

/// Migrates the given fields, writing through the regular update path.
///
/// The foreign file is deleted only after the local write succeeded. Local
/// fields outside `allow_list` are never touched.
pub async fn migrate_fields(
    foreign_path: &Path,
    local_path: &Path,
    allow_list: &[&str],
    fallback: ConfigDocument,
    dev_mode: bool,
) -> Result<MigrationReport, ConfigError> {
    let foreign = match load_foreign(foreign_path).await {
        Ok(foreign) => foreign,
        Err(e) => {
            error!(path = %foreign_path.display(), error = %e, "cannot migrate foreign config");
            return Err(e);
        }
    };

    let subset: Map<String, Value> = allow_list
        .iter()
        .filter_map(|field| {
            foreign
                .get(field)
                .map(|value| (field.to_string(), value.clone()))
        })
        .collect();
    let migrated: Vec<String> = subset.keys().cloned().collect();

    let outcome = match update_config(local_path, &Value::Object(subset), fallback, dev_mode).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(path = %local_path.display(), error = %e, "migration write failed, foreign config kept");
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::remove_file(foreign_path).await {
        warn!(path = %foreign_path.display(), error = %e, "could not remove migrated foreign config");
    }
    info!(
        from = %foreign_path.display(),
        to = %local_path.display(),
        fields = migrated.len(),
        "migrated foreign config"
    );

    Ok(MigrationReport { migrated, outcome })
}

async fn load_foreign(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let variant = ConfigVariant::from_path(path).unwrap_or(ConfigVariant::StructuredText);
    let invalid = |reason: &str| ConfigError::InvalidForeign {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    match source_for(path, variant).load().await {
        Ok(Some(ParsedText::Parsed(document) | ParsedText::Repaired(document))) => Ok(document),
        Ok(Some(ParsedText::Empty)) => Err(invalid("document is empty")),
        Ok(None) => Err(invalid("file not found")),
        Err(ConfigError::Corrupt { reason, .. }) => Err(invalid(&reason)),
        Err(e) => Err(e),
    }
}

//! Canonical default documents, optionally seeded from the project on disk.

use std::path::Path;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::detect::{
    detect_features, detect_libraries, detect_project_framework, read_biome_style, Manifest,
};
use crate::document::{ConfigDocument, SCHEMA_DEV, SCHEMA_URL, UNKNOWN_VALUE};
use crate::merge::clean_repo_url;
use crate::parse::strip_bom;

const DEFAULT_DOMAIN: &str = "https://example.com";

/// Lockfiles checked in priority order, with the manager each implies.
const LOCKFILES: &[(&str, &str)] = &[
    ("bun.lock", "bun"),
    ("bun.lockb", "bun"),
    ("pnpm-lock.yaml", "pnpm"),
    ("yarn.lock", "yarn"),
];

/// Returns the value of `$schema` for the given mode.
pub fn schema_reference(dev_mode: bool) -> &'static str {
    if dev_mode {
        SCHEMA_DEV
    } else {
        SCHEMA_URL
    }
}

/// Library slots under `preferredLibraries`, all defaulting to `unknown`.
const LIBRARY_SLOTS: &[&str] = &[
    "stateManagement",
    "formManagement",
    "styling",
    "uiComponents",
    "testing",
    "authentication",
    "databaseLibrary",
    "databaseProvider",
    "api",
    "linting",
    "formatting",
    "payment",
    "analytics",
    "monitoring",
    "logging",
    "notifications",
    "search",
    "uploads",
    "validation",
    "documentation",
    "icons",
    "mail",
    "cache",
    "storage",
    "cdn",
    "cms",
    "i18n",
    "seo",
    "motion",
    "charts",
    "dates",
    "markdown",
    "routing",
];

/// The canonical default document. Every schema field is populated.
pub fn default_document(dev_mode: bool) -> ConfigDocument {
    let mut document = ConfigDocument::new();
    let sections = [
        project_metadata_defaults(dev_mode),
        tech_stack_defaults(),
        repo_and_prompt_defaults(),
    ];
    for section in sections {
        if let Value::Object(fields) = section {
            for (key, value) in fields {
                document.set(key, value);
            }
        }
    }
    document
}

fn project_metadata_defaults(dev_mode: bool) -> Value {
    json!({
        "$schema": schema_reference(dev_mode),
        "projectName": UNKNOWN_VALUE,
        "projectAuthor": UNKNOWN_VALUE,
        "projectDescription": "",
        "version": "0.1.0",
        "projectLicense": "MIT",
        "projectState": "creating",
        "projectRepository": DEFAULT_DOMAIN,
        "projectDomain": DEFAULT_DOMAIN,
        "projectCategory": UNKNOWN_VALUE,
        "projectSubcategory": UNKNOWN_VALUE,
        "projectTemplate": UNKNOWN_VALUE,
        "projectTemplateDate": UNKNOWN_VALUE,
        "projectArchitecture": UNKNOWN_VALUE,
        "repoPrivacy": UNKNOWN_VALUE,
        "projectGitService": "github",
        "projectDeployService": "vercel",
        "repoBranch": "main",
    })
}

fn tech_stack_defaults() -> Value {
    json!({
        "projectFramework": UNKNOWN_VALUE,
        "projectPackageManager": "npm",
        "projectRuntime": "node",
        "preferredLibraries": preferred_libraries_defaults(),
        "monorepo": {
            "type": "none",
            "packages": [],
            "sharedPackages": [],
        },
        "ignoreDependencies": [],
        "customRules": {},
        "features": features_defaults(),
        "codeStyle": code_style_defaults(),
    })
}

fn preferred_libraries_defaults() -> Value {
    Value::Object(
        LIBRARY_SLOTS
            .iter()
            .map(|slot| (slot.to_string(), Value::String(UNKNOWN_VALUE.to_string())))
            .collect(),
    )
}

fn features_defaults() -> Value {
    json!({
        "i18n": false,
        "analytics": false,
        "themeMode": "dark-light",
        "authentication": false,
        "api": false,
        "database": false,
        "testing": false,
        "docker": false,
        "ci": false,
        "commands": [],
        "webview": [],
        "language": ["typescript"],
        "themes": ["default"],
    })
}

fn code_style_defaults() -> Value {
    let modernize = json!({
        "replaceFs": false,
        "replacePath": false,
        "replaceHttp": false,
        "replaceProcess": false,
        "replaceConsole": false,
        "replaceEvents": false,
    });
    json!({
        "lineWidth": 80,
        "indentSize": 2,
        "indentStyle": "space",
        "quoteMark": "double",
        "semicolons": true,
        "trailingComma": "all",
        "bracketSpacing": true,
        "arrowParens": "always",
        "tabWidth": 2,
        "jsToTs": false,
        "dontRemoveComments": true,
        "shouldAddComments": true,
        "typeOrInterface": "type",
        "importOrRequire": "import",
        "cjsToEsm": false,
        "modernize": modernize,
        "importSymbol": "",
    })
}

fn repo_and_prompt_defaults() -> Value {
    json!({
        "multipleRepoCloneMode": false,
        "customUserFocusedRepos": [],
        "customDevsFocusedRepos": [],
        "hideRepoSuggestions": false,
        "customReposOnNewProject": false,
        "envComposerOpenBrowser": true,
        "skipPromptsUseAutoBehavior": false,
        "deployBehavior": "prompt",
        "depsBehavior": "prompt",
        "gitBehavior": "prompt",
        "i18nBehavior": "prompt",
        "scriptsBehavior": "prompt",
        "existingRepoBehavior": "prompt",
        "relinterConfirm": "promptOnce",
    })
}

/// Defaults seeded from the project under `root`.
///
/// Metadata comes from `package.json`, the package manager from lockfiles,
/// the framework and library choices from dependencies and marker files,
/// and formatter settings from `biome.jsonc`. Anything missing or malformed
/// leaves the canonical value in place.
pub async fn generate_default_document(root: &Path, dev_mode: bool) -> ConfigDocument {
    let mut document = default_document(dev_mode);

    let manifest = read_manifest(root).await;
    if let Some(manifest) = &manifest {
        seed_from_manifest(&mut document, manifest);
    }
    document.set(
        "projectPackageManager",
        Value::String(detect_package_manager(root).await.to_string()),
    );

    let project = manifest.as_ref().map(Manifest::from_value).unwrap_or_default();
    if let Some(framework) = detect_project_framework(root).await {
        debug!(framework, "detected project framework");
        document.set("projectFramework", Value::String(framework.to_string()));
    }

    let libraries = detect_libraries(root, &project)
        .await
        .into_iter()
        .map(|(slot, choice)| (slot.to_string(), Value::String(choice.to_string())));
    overlay_section(&mut document, "preferredLibraries", libraries);
    overlay_section(&mut document, "features", detect_features(root, &project).await);
    if let Some(style) = read_biome_style(root).await {
        overlay_section(&mut document, "codeStyle", style);
    }
    document
}

/// Writes `fields` into the object at `section`, keeping its key order.
fn overlay_section(
    document: &mut ConfigDocument,
    section: &str,
    fields: impl IntoIterator<Item = (String, Value)>,
) {
    if let Some(Value::Object(target)) = document.get_mut(section) {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
}

async fn read_manifest(root: &Path) -> Option<Value> {
    let path = root.join("package.json");
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read package manifest");
            return None;
        }
    };
    match serde_json::from_str::<Value>(strip_bom(&text)) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => {
            warn!(path = %path.display(), "package manifest is not a JSON object, ignoring it");
            None
        }
    }
}

fn seed_from_manifest(document: &mut ConfigDocument, manifest: &Value) {
    let non_blank = |value: Option<&Value>| -> Option<String> {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let author = match manifest.get("author") {
        Some(Value::Object(person)) => non_blank(person.get("name")),
        other => non_blank(other),
    };
    let repository = match manifest.get("repository") {
        Some(Value::Object(repo)) => non_blank(repo.get("url")),
        other => non_blank(other),
    };

    let seeds = [
        ("projectName", non_blank(manifest.get("name"))),
        ("projectAuthor", author),
        ("projectDescription", non_blank(manifest.get("description"))),
        ("version", non_blank(manifest.get("version"))),
        ("projectLicense", non_blank(manifest.get("license"))),
        ("projectRepository", repository.map(|url| clean_repo_url(&url))),
    ];
    for (field, seed) in seeds {
        if let Some(value) = seed {
            debug!(field, "seeded default from package manifest");
            document.set(field, Value::String(value));
        }
    }
}

async fn detect_package_manager(root: &Path) -> &'static str {
    for &(lockfile, manager) in LOCKFILES {
        if tokio::fs::try_exists(root.join(lockfile))
            .await
            .unwrap_or(false)
        {
            return manager;
        }
    }
    "npm"
}

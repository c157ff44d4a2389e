use std::path::Path;

use projconf::atomic::{atomic_write, ArtifactPaths};
use projconf::merge::merge_with_defaults;
use projconf::migrate::migrate_fields;
use projconf::reader::read_config;
use projconf::write::write_config;
use projconf::{
    default_document, generate_default_document, validate, ConfigError, ConfigStore,
    ConfigVariant, EngineSettings, ReadMode, ReadOutcome,
};
use serde_json::json;
use tempfile::TempDir;

fn store() -> ConfigStore {
    ConfigStore::builder()
        .with_settings(EngineSettings::default())
        .build()
        .unwrap()
}

fn write_file(path: &Path, text: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

#[tokio::test]
async fn test_generated_defaults_always_validate() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir.path().join("package.json"),
        r#"{"name": "", "author": 42, "license": "ISC"}"#,
    );
    for dev_mode in [false, true] {
        let doc = generate_default_document(dir.path(), dev_mode).await;
        assert!(validate(&doc.to_value()).is_ok());
        assert_eq!(doc.get_str("projectLicense"), Some("ISC"));
    }
}

#[tokio::test]
async fn test_write_then_read_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".config/rse.jsonc");
    let mut doc = default_document(false);
    doc.set("projectName", json!("round-trip"));
    doc.set("customRules", json!({"nested": {"list": [1, "two", null]}}));

    write_config(&path, &doc, false).await.unwrap();
    let outcome = read_config(&path, false, ReadMode::Persist).await.unwrap();
    assert_eq!(outcome, ReadOutcome::Valid(doc));
}

#[test]
fn test_merging_is_idempotent() {
    let defaults = default_document(false);
    let damaged = json!({
        "projectName": "demo",
        "codeStyle": {"indentStyle": "both", "modernize": {"replaceFs": "sure"}},
        "monorepo": [],
    });
    let once = merge_with_defaults(&damaged, &defaults).unwrap().document;
    let twice = merge_with_defaults(&once.to_value(), &defaults).unwrap().document;
    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_broken_text_never_yields_a_partial_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rse.jsonc");
    write_file(&path, "{ invalid");

    match read_config(&path, false, ReadMode::Persist).await {
        Err(ConfigError::Corrupt { .. }) => {}
        Ok(outcome) => {
            let doc = outcome.into_document().expect("a document");
            assert!(validate(&doc.to_value()).is_ok());
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_interrupted_write_preserves_destination() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".config/rse.jsonc");
    write_file(&path, "{\"projectName\": \"before\", \"projectAuthor\": \"ada\"}");
    let before = std::fs::read_to_string(&path).unwrap();

    // occupy the temp sibling so the temp write cannot happen
    std::fs::create_dir(ArtifactPaths::for_path(&path).temp).unwrap();
    let err = atomic_write(&path, "{}").await.unwrap_err();

    assert!(matches!(err, ConfigError::WriteFailed { .. }));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert!(ArtifactPaths::for_path(&path).backup.exists());
}

#[tokio::test]
async fn test_multi_config_skips_broken_member() {
    let dir = TempDir::new().unwrap();
    let multi = dir.path().join(".config/mrse");
    write_file(&multi.join("api.jsonc"), r#"{"projectName": "api", "projectAuthor": "ada"}"#);
    write_file(&multi.join("web.jsonc"), "{ invalid");
    write_file(&multi.join("api.jsonc.bak"), r#"{"projectName": "stale", "projectAuthor": "ada"}"#);

    let loaded = store().load_multi_configs(dir.path(), false).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].document.get_str("projectName"), Some("api"));
}

#[tokio::test]
async fn test_migration_moves_only_allow_listed_fields() {
    let dir = TempDir::new().unwrap();
    let foreign = dir.path().join("foreign.jsonc");
    let local = dir.path().join(".config/rse.jsonc");
    write_file(&foreign, r#"{"projectDescription": "x", "unknownField": "y"}"#);
    write_config(&local, &default_document(false), false).await.unwrap();

    let report = migrate_fields(
        &foreign,
        &local,
        &["projectDescription"],
        default_document(false),
        false,
    )
    .await
    .unwrap();
    assert_eq!(report.migrated, vec!["projectDescription"]);

    let doc = read_config(&local, false, ReadMode::Persist)
        .await
        .unwrap()
        .into_document()
        .unwrap();
    assert_eq!(doc.get_str("projectDescription"), Some("x"));
    assert!(!doc.contains_key("unknownField"));
    assert!(!foreign.exists());
}

#[tokio::test]
async fn test_empty_content_then_default_write() {
    let dir = TempDir::new().unwrap();
    let store = store();
    let resolved = store.resolve_config_path(dir.path(), false).await;
    assert_eq!(resolved.variant, ConfigVariant::StructuredText);
    write_file(&resolved.path, "");

    assert_eq!(
        store.read_config(&resolved.path, false).await.unwrap(),
        ReadOutcome::NotFound
    );

    let defaults = default_document(false);
    store.write_config(&resolved.path, &defaults, false).await.unwrap();
    assert_eq!(
        store.read_config(&resolved.path, false).await.unwrap(),
        ReadOutcome::Valid(defaults)
    );
}

#[tokio::test]
async fn test_store_migration_targets_the_resolved_document() {
    let dir = TempDir::new().unwrap();
    let store = store();
    let foreign = dir.path().join("old/rse.jsonc");
    write_file(&foreign, r#"{"projectName": "old", "deployBehavior": "autoYes"}"#);

    let report = store
        .migrate_foreign_config(&foreign, dir.path(), false)
        .await
        .unwrap();
    assert_eq!(report.migrated, vec!["deployBehavior"]);

    let doc = store.load_or_create(dir.path(), false, &json!({})).await.unwrap();
    assert_eq!(doc.get_str("deployBehavior"), Some("autoYes"));
    assert_eq!(doc.get_str("projectName"), Some("unknown"));
}

#[tokio::test]
async fn test_custom_settings_move_the_layout() {
    let dir = TempDir::new().unwrap();
    let settings = EngineSettings {
        config_dir: "cfg".into(),
        file_stem: "project".into(),
        ..Default::default()
    };
    let store = ConfigStore::builder().with_settings(settings).build().unwrap();

    store.load_or_create(dir.path(), false, &json!({})).await.unwrap();
    assert!(dir.path().join("cfg/project.jsonc").exists());
}

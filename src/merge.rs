//! Field-local reconciliation of documents against defaults, plus the
//! update-side deep merge and diff helpers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::document::ConfigDocument;
use crate::schema::{self, index_path, join_path, project_schema, Shape, ValidationErrors};

/// Repository lists whose entries are normalized to `owner/repo`.
const REPO_LIST_FIELDS: &[&str] = &["customUserFocusedRepos", "customDevsFocusedRepos"];

static GIT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^git\+").unwrap());
static HOST_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://(www\.)?(github|gitlab|bitbucket|sourcehut)\.com/").unwrap()
});
static BARE_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(github|gitlab|bitbucket|sourcehut)\.com/").unwrap());
static GIT_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.git$").unwrap());

/// Strips `git+`, a known forge host and a `.git` suffix from a repository URL.
pub fn clean_repo_url(url: &str) -> String {
    let url = GIT_PREFIX.replace(url.trim(), "");
    let url = HOST_URL.replace(&url, "");
    let url = BARE_HOST.replace(&url, "");
    GIT_SUFFIX.replace(&url, "").into_owned()
}

/// Outcome of reconciling a document against defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub document: ConfigDocument,
    /// Paths whose value was missing or invalid and now comes from the defaults.
    pub defaulted: Vec<String>,
    /// Paths dropped because the schema does not know them or no default exists.
    pub dropped: Vec<String>,
}

impl MergeReport {
    pub fn is_noop(&self) -> bool {
        self.defaulted.is_empty() && self.dropped.is_empty()
    }
}

/// Keeps every individually valid field of `value` and fills the rest from
/// `defaults`, then re-validates.
///
/// Fails with the remaining errors when even the merged result is invalid;
/// no partially valid document is ever returned.
pub fn merge_with_defaults(
    value: &Value,
    defaults: &ConfigDocument,
) -> Result<MergeReport, ValidationErrors> {
    let mut report = Reconciler::default();
    let defaults = defaults.to_value();
    let mut merged = report
        .reconcile(project_schema(), Some(value), Some(&defaults), "")
        .unwrap_or(Value::Null);
    normalize_repo_lists(&mut merged);

    let document = schema::validate(&merged)?;
    Ok(MergeReport {
        document,
        defaulted: report.defaulted,
        dropped: report.dropped,
    })
}

#[derive(Default)]
struct Reconciler {
    defaulted: Vec<String>,
    dropped: Vec<String>,
}

impl Reconciler {
    fn reconcile(
        &mut self,
        shape: &Shape,
        input: Option<&Value>,
        default: Option<&Value>,
        path: &str,
    ) -> Option<Value> {
        match (shape, input) {
            (Shape::Object(fields), Some(Value::Object(map))) => {
                let empty = Map::new();
                let defaults = default.and_then(Value::as_object).unwrap_or(&empty);
                let mut out = Map::new();

                for (key, child) in map {
                    let child_path = join_path(path, key);
                    match shape.field(key) {
                        Some(field) => {
                            let merged =
                                self.reconcile(&field.shape, Some(child), defaults.get(key), &child_path);
                            if let Some(merged) = merged {
                                out.insert(key.clone(), merged);
                            }
                        }
                        None => self.dropped.push(child_path),
                    }
                }
                for field in fields {
                    if map.contains_key(field.name) {
                        continue;
                    }
                    if let Some(fallback) = defaults.get(field.name) {
                        self.defaulted.push(join_path(path, field.name));
                        out.insert(field.name.to_string(), fallback.clone());
                    }
                }
                Some(Value::Object(out))
            }
            (_, Some(value)) if schema::validate_against(shape, value).is_empty() => {
                Some(value.clone())
            }
            (_, input) => match default {
                Some(fallback) => {
                    self.defaulted.push(path.to_string());
                    Some(fallback.clone())
                }
                None => {
                    if input.is_some() {
                        self.dropped.push(path.to_string());
                    }
                    None
                }
            },
        }
    }
}

fn normalize_repo_lists(value: &mut Value) {
    for field in REPO_LIST_FIELDS {
        if let Some(Value::Array(items)) = value.get_mut(*field) {
            for item in items.iter_mut() {
                if let Value::String(url) = item {
                    *url = clean_repo_url(url);
                }
            }
        }
    }
}

/// Merges `updates` into `base`: objects recurse, everything else replaces,
/// and `null` in `updates` means "not specified".
pub fn deep_merge(base: &mut Value, updates: &Value) {
    match (base, updates) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(update_map)) => {
            for (key, update) in update_map {
                if update.is_null() {
                    continue;
                }
                match base_map.get_mut(key) {
                    Some(existing) if existing.is_object() && update.is_object() => {
                        deep_merge(existing, update);
                    }
                    _ => {
                        base_map.insert(key.clone(), update.clone());
                    }
                }
            }
        }
        (base, updates) => *base = updates.clone(),
    }
}

/// Field paths whose values differ between two documents.
///
/// Objects are compared key by key; arrays and scalars as whole values.
pub fn diff(before: &Value, after: &Value) -> Vec<String> {
    let mut changes = Vec::new();
    collect_changes(before, after, "", &mut changes);
    changes
}

fn collect_changes(before: &Value, after: &Value, path: &str, changes: &mut Vec<String>) {
    match (before, after) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, left) in a {
                let child = join_path(path, key);
                match b.get(key) {
                    Some(right) => collect_changes(left, right, &child, changes),
                    None => changes.push(child),
                }
            }
            for key in b.keys().filter(|k| !a.contains_key(*k)) {
                changes.push(join_path(path, key));
            }
        }
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => {
            for (i, (left, right)) in a.iter().zip(b).enumerate() {
                if left != right {
                    changes.push(index_path(path, i));
                }
            }
        }
        (a, b) if a != b => changes.push(path.to_string()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_document;
    use serde_json::json;

    #[test]
    fn test_clean_repo_url_variants() {
        assert_eq!(clean_repo_url("git+https://github.com/ada/shop.git"), "ada/shop");
        assert_eq!(clean_repo_url(" https://www.GitLab.com/team/app "), "team/app");
        assert_eq!(clean_repo_url("github.com/ada/shop"), "ada/shop");
        assert_eq!(clean_repo_url("ada/shop"), "ada/shop");
    }

    #[test]
    fn test_invalid_leaf_keeps_valid_siblings() {
        let input = json!({
            "projectName": "demo",
            "projectAuthor": "ada",
            "codeStyle": {"lineWidth": "wide", "quoteMark": "single"},
            "mystery": 1,
        });
        let report = merge_with_defaults(&input, &default_document(false)).unwrap();
        let code_style = report.document.get("codeStyle").unwrap();

        assert_eq!(code_style["quoteMark"], "single");
        assert_eq!(code_style["lineWidth"], 80);
        assert_eq!(report.document.get_str("projectName"), Some("demo"));
        assert!(report.defaulted.contains(&"codeStyle.lineWidth".to_string()));
        assert!(report.defaulted.contains(&"features".to_string()));
        assert_eq!(report.dropped, vec!["mystery".to_string()]);
        assert!(!report.document.contains_key("mystery"));
    }

    #[test]
    fn test_merging_twice_is_idempotent() {
        let input = json!({
            "projectName": "",
            "customUserFocusedRepos": ["https://github.com/ada/shop.git"],
            "features": {"i18n": "yes"},
        });
        let defaults = default_document(false);
        let first = merge_with_defaults(&input, &defaults).unwrap();
        let second = merge_with_defaults(&first.document.to_value(), &defaults).unwrap();

        assert_eq!(first.document, second.document);
        assert!(second.is_noop());
        assert_eq!(
            first.document.get("customUserFocusedRepos"),
            Some(&json!(["ada/shop"]))
        );
    }

    #[test]
    fn test_merge_fails_when_defaults_cannot_help() {
        let input = json!({"projectName": 3});
        let errors = merge_with_defaults(&input, &ConfigDocument::new()).unwrap_err();
        assert_eq!(errors.paths(), vec!["projectName", "projectAuthor"]);
    }

    #[test]
    fn test_deep_merge_treats_null_as_unspecified() {
        let mut base = json!({"a": {"x": 1, "y": 2}, "list": [1, 2], "keep": true});
        deep_merge(
            &mut base,
            &json!({"a": {"y": 3, "x": null}, "list": [9], "keep": null, "new": "v"}),
        );
        assert_eq!(
            base,
            json!({"a": {"x": 1, "y": 3}, "list": [9], "keep": true, "new": "v"})
        );
    }

    #[test]
    fn test_diff_reports_nested_paths() {
        let before = json!({"a": 1, "o": {"x": true, "y": [1, 2]}, "gone": 0});
        let after = json!({"a": 1, "o": {"x": false, "y": [1, 3]}, "new": 0});
        assert_eq!(diff(&before, &after), vec!["o.x", "o.y[1]", "gone", "new"]);
        assert!(diff(&before, &before).is_empty());
    }
}

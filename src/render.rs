//! Structured-text rendering with section comments.

use crate::document::ConfigDocument;

/// Comment lines placed before selected top-level keys.
const SECTION_COMMENTS: &[(&str, &[&str])] = &[
    (
        "$schema",
        &[
            "RSE CONFIG (https://docs.reliverse.org/cli)",
            "Restart the CLI to apply your config changes",
        ],
    ),
    ("projectName", &["General project information"]),
    ("projectFramework", &["Primary tech stack/framework"]),
    ("ignoreDependencies", &["List dependencies to exclude from checks"]),
    (
        "customRules",
        &[
            "Provide custom rules for Reliverse AI",
            "You can use any json type here in {}",
        ],
    ),
    ("features", &["Project features"]),
    ("codeStyle", &["Code style preferences"]),
    ("multipleRepoCloneMode", &["Settings for cloning an existing repo"]),
    (
        "envComposerOpenBrowser",
        &["Set to false to disable opening the browser during env composing"],
    ),
    (
        "skipPromptsUseAutoBehavior",
        &[
            "Enable auto-answering for prompts to skip manual confirmations.",
            "Make sure you have unknown values configured above.",
        ],
    ),
    (
        "deployBehavior",
        &[
            "Prompt behavior for deployment",
            "Options: prompt | autoYes | autoNo",
        ],
    ),
    (
        "existingRepoBehavior",
        &[
            "Behavior for existing GitHub repos during project creation",
            "Options: prompt | autoYes | autoYesSkipCommit | autoNo",
        ],
    ),
    (
        "relinterConfirm",
        &[
            "Behavior for Reliverse AI chat and agent mode",
            "Options: promptOnce | promptEachFile | autoYes",
        ],
    ),
];

/// Renders a document as two-space indented JSON with section comments and a
/// trailing newline. The parser strips the comments again, so rendering and
/// reading round-trip.
pub fn render_document(document: &ConfigDocument) -> String {
    let pretty = match serde_json::to_string_pretty(document.as_map()) {
        Ok(pretty) => pretty,
        // a map of JSON values always serializes
        Err(_) => return "{}\n".to_string(),
    };

    let mut out = String::with_capacity(pretty.len() + 1024);
    let mut first_entry = true;
    for line in pretty.lines() {
        if let Some(comments) = top_level_key(line).and_then(comments_for) {
            if !first_entry {
                out.push('\n');
            }
            for comment in comments {
                out.push_str("  // ");
                out.push_str(comment);
                out.push('\n');
            }
        }
        if top_level_key(line).is_some() {
            first_entry = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// The key of a line like `  "name": ...`, only at the first nesting level.
fn top_level_key(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("  \"")?;
    let end = rest.find("\":")?;
    Some(&rest[..end])
}

fn comments_for(key: &str) -> Option<&'static [&'static str]> {
    SECTION_COMMENTS
        .iter()
        .find(|(section, _)| *section == key)
        .map(|(_, lines)| *lines)
}

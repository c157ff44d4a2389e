//! Text to document: tolerant parsing with a repair fallback.

mod jsonc;
mod repair;
mod script;

pub use jsonc::normalize;
pub use repair::{repair, Repaired};
pub use script::parse_script;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::document::ConfigDocument;

/// Text that could not be turned into a document.
///
/// The reason names the position or construct, never the offending text.
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct ParseFailure {
    pub reason: String,
}

impl ParseFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Result of a successful structured-text parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedText {
    /// Blank content or the empty-document sentinel.
    Empty,
    Parsed(ConfigDocument),
    /// Only parseable after repair; the file deserves a rewrite.
    Repaired(ConfigDocument),
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Drops the leading byte-order mark some editors prepend on save.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text)
}

/// Blank text or a bare `{}` count as "no document".
pub fn is_empty_sentinel(text: &str) -> bool {
    matches!(strip_bom(text).trim(), "" | "{}")
}

/// Parses comment and trailing-comma tolerant text, repairing it if needed.
pub fn parse_structured_text(text: &str) -> Result<ParsedText, ParseFailure> {
    let text = strip_bom(text);
    if is_empty_sentinel(text) {
        return Ok(ParsedText::Empty);
    }

    let failure = match parse_object(&normalize(text)) {
        Ok(document) => return Ok(ParsedText::Parsed(document)),
        Err(failure) => failure,
    };

    match repair(text) {
        Some(Repaired { document, strategy }) => {
            debug!(strategy, "structured text parsed after repair");
            Ok(ParsedText::Repaired(document))
        }
        None => Err(failure),
    }
}

fn parse_object(text: &str) -> Result<ConfigDocument, ParseFailure> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        ParseFailure::new(format!(
            "syntax error at line {} column {}",
            e.line(),
            e.column()
        ))
    })?;
    ConfigDocument::from_value(value).map_err(|other| {
        ParseFailure::new(format!("expected an object, found {}", kind(&other)))
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Reads the document exported by a script config without running it.
//!
//! Only the literal after `export default` (optionally wrapped in one call,
//! as in `defineConfig({...})`) is considered. Anything computed at runtime
//! makes the literal unparseable.

use serde_json::Value;

use super::repair::{normalize_quotes, render, tokenize, Token};
use super::{jsonc, ParseFailure};
use crate::document::ConfigDocument;

const EXPORT_MARKER: &str = "export default";

/// Extracts and parses the default-export object literal of a script.
pub fn parse_script(source: &str) -> Result<ConfigDocument, ParseFailure> {
    let stripped = jsonc::strip_comments(super::strip_bom(source));
    let literal = extract_literal(&stripped)?;
    let text = jsonc::normalize(&render(&normalize_quotes(literal)));

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(ConfigDocument::from(map)),
        Ok(_) => Err(ParseFailure::new("default export is not an object literal")),
        Err(e) => Err(ParseFailure::new(format!(
            "default export is not a plain literal: {e}"
        ))),
    }
}

fn extract_literal(source: &str) -> Result<Vec<Token>, ParseFailure> {
    let start = source
        .find(EXPORT_MARKER)
        .ok_or_else(|| ParseFailure::new("no default export found"))?;
    let tokens = tokenize(&source[start + EXPORT_MARKER.len()..]);

    let mut significant = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !matches!(t, Token::Space(_)));

    let open = match significant.next() {
        Some((i, Token::Punct('{'))) => i,
        Some((_, Token::Word(_))) => match (significant.next(), significant.next()) {
            (Some((_, Token::Other('('))), Some((i, Token::Punct('{')))) => i,
            _ => return Err(ParseFailure::new("default export is not an object literal")),
        },
        _ => return Err(ParseFailure::new("default export is not an object literal")),
    };

    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::Punct('{') | Token::Punct('[') => depth += 1,
            Token::Punct('}') | Token::Punct(']') => {
                depth -= 1;
                if depth == 0 {
                    return Ok(tokens[open..=i].to_vec());
                }
            }
            _ => {}
        }
    }
    Err(ParseFailure::new("default export literal is not closed"))
}

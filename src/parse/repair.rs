//! Best-effort reconstruction of hand-damaged structured text.
//!
//! The text is split into a loose token stream, then fixed-order strategies
//! are applied cumulatively. After each strategy the result is normalized and
//! parsed; the first one yielding an object wins.

use serde_json::Value;
use tracing::debug;

use super::jsonc;
use crate::document::ConfigDocument;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// One of `{ } [ ] : ,`.
    Punct(char),
    /// A quoted string including its delimiters.
    Str { raw: String, quote: char, closed: bool },
    /// Identifier, number or bare literal.
    Word(String),
    Space(String),
    /// Anything the JSON grammar has no use for.
    Other(char),
}

impl Token {
    fn is_space(&self) -> bool {
        matches!(self, Token::Space(_))
    }

    fn ends_value(&self) -> bool {
        matches!(
            self,
            Token::Str { .. } | Token::Word(_) | Token::Punct('}') | Token::Punct(']')
        )
    }

    fn starts_value(&self) -> bool {
        matches!(
            self,
            Token::Str { .. } | Token::Word(_) | Token::Punct('{') | Token::Punct('[')
        )
    }
}

/// A successful repair and the last strategy it needed.
#[derive(Debug)]
pub struct Repaired {
    pub document: ConfigDocument,
    pub strategy: &'static str,
}

type Strategy = fn(Vec<Token>) -> Vec<Token>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("normalize-quotes", normalize_quotes),
    ("insert-commas", insert_missing_commas),
    ("balance-brackets", balance_brackets),
];

/// Runs the repair strategies in order; `None` if none yields an object.
pub fn repair(text: &str) -> Option<Repaired> {
    let mut tokens = tokenize(&jsonc::strip_comments(text));
    for &(name, strategy) in STRATEGIES {
        tokens = strategy(tokens);
        let candidate = jsonc::strip_trailing_commas(&render(&tokens));
        match serde_json::from_str::<Value>(&candidate) {
            Ok(Value::Object(map)) => {
                return Some(Repaired {
                    document: ConfigDocument::from(map),
                    strategy: name,
                })
            }
            Ok(_) => debug!(strategy = name, "repair produced a non-object"),
            Err(e) => debug!(strategy = name, error = %e, "repair attempt did not parse"),
        }
    }
    None
}

pub(crate) fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' | '}' | '[' | ']' | ':' | ',' => tokens.push(Token::Punct(ch)),
            '"' | '\'' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}' => {
                let closing = closing_quote(ch);
                let mut raw = String::from(ch);
                let mut closed = false;
                while let Some(c) = chars.next() {
                    raw.push(c);
                    if c == '\\' {
                        if let Some(escaped) = chars.next() {
                            raw.push(escaped);
                        }
                    } else if c == closing || (c == '\n' && ch != '"') {
                        closed = c == closing;
                        break;
                    }
                }
                tokens.push(Token::Str {
                    raw,
                    quote: ch,
                    closed,
                });
            }
            c if c.is_whitespace() => {
                let mut space = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !next.is_whitespace() {
                        break;
                    }
                    space.push(next);
                    chars.next();
                }
                tokens.push(Token::Space(space));
            }
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !is_word_char(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
            other => tokens.push(Token::Other(other)),
        }
    }

    tokens
}

pub(crate) fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Punct(c) | Token::Other(c) => out.push(*c),
            Token::Str { raw, .. } => out.push_str(raw),
            Token::Word(w) | Token::Space(w) => out.push_str(w),
        }
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '-' | '+' | '.')
}

fn closing_quote(open: char) -> char {
    match open {
        '\u{201c}' => '\u{201d}',
        '\u{2018}' => '\u{2019}',
        other => other,
    }
}

fn next_significant(tokens: &[Token], from: usize) -> Option<&Token> {
    tokens[from..].iter().find(|t| !t.is_space())
}

/// Converts every string to double quotes, quotes bare keys and maps foreign
/// constants (`True`, `None`, `undefined`) to their JSON spelling.
pub(crate) fn normalize_quotes(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        let replaced = match token {
            Token::Str { raw, quote, closed } if *quote != '"' => Token::Str {
                raw: requote(raw, *quote, *closed),
                quote: '"',
                closed: *closed,
            },
            Token::Word(word) if next_significant(&tokens, i + 1) == Some(&Token::Punct(':')) => {
                Token::Str {
                    raw: format!("\"{word}\""),
                    quote: '"',
                    closed: true,
                }
            }
            Token::Word(word) => Token::Word(
                match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" | "undefined" => "null",
                    other => other,
                }
                .to_string(),
            ),
            other => other.clone(),
        };
        out.push(replaced);
    }
    out
}

fn requote(raw: &str, quote: char, closed: bool) -> String {
    let closing = closing_quote(quote);
    let mut inner: Vec<char> = raw.chars().skip(1).collect();
    if closed {
        inner.pop();
    }

    let mut body = String::from('"');
    let mut chars = inner.into_iter().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) if escaped == quote || escaped == closing => body.push(escaped),
                Some(escaped) => {
                    body.push('\\');
                    body.push(escaped);
                }
                None => body.push_str("\\\\"),
            },
            '"' => body.push_str("\\\""),
            '\n' => {}
            other => body.push(other),
        }
    }
    if closed {
        body.push('"');
    }
    body
}

/// Inserts a comma between two values separated only by whitespace.
pub(crate) fn insert_missing_commas(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut last_significant: Option<Token> = None;

    for token in tokens {
        if token.is_space() {
            out.push(token);
            continue;
        }
        if let Some(previous) = &last_significant {
            if previous.ends_value() && token.starts_value() {
                let at = out
                    .iter()
                    .rposition(|t| !t.is_space())
                    .map_or(0, |p| p + 1);
                out.insert(at, Token::Punct(','));
            }
        }
        last_significant = Some(token.clone());
        out.push(token);
    }
    out
}

/// Closes unterminated strings, drops unmatched closers and appends the
/// closers still owed at end of input.
pub(crate) fn balance_brackets(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<char> = Vec::new();

    for token in tokens {
        match token {
            Token::Str {
                mut raw,
                quote,
                closed: false,
            } => {
                let trimmed = raw.trim_end_matches('\n').len();
                raw.truncate(trimmed);
                raw.push(closing_quote(quote));
                out.push(Token::Str {
                    raw,
                    quote,
                    closed: true,
                });
            }
            Token::Punct(open @ ('{' | '[')) => {
                stack.push(if open == '{' { '}' } else { ']' });
                out.push(token);
            }
            Token::Punct(close @ ('}' | ']')) => {
                if !stack.contains(&close) {
                    continue;
                }
                while let Some(expected) = stack.pop() {
                    close_value(&mut out);
                    out.push(Token::Punct(expected));
                    if expected == close {
                        break;
                    }
                }
            }
            other => out.push(other),
        }
    }

    while let Some(expected) = stack.pop() {
        close_value(&mut out);
        out.push(Token::Punct(expected));
    }
    out
}

/// A key left hanging before a forced closer gets a `null` value.
fn close_value(out: &mut Vec<Token>) {
    if let Some(last) = out.iter().rev().find(|t| !t.is_space()) {
        if *last == Token::Punct(':') {
            out.push(Token::Word("null".to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repaired(text: &str) -> Repaired {
        repair(text).expect("text should be repairable")
    }

    #[test]
    fn test_single_quotes_and_bare_keys() {
        let result = repaired("{'projectName': 'it\\'s', projectAuthor: \"me\",}");
        assert_eq!(result.strategy, "normalize-quotes");
        assert_eq!(result.document.get_str("projectName"), Some("it's"));
        assert_eq!(result.document.get_str("projectAuthor"), Some("me"));
    }

    #[test]
    fn test_smart_quotes_are_straightened() {
        let result = repaired("{\u{201c}projectName\u{201d}: \u{201c}demo\u{201d}}");
        assert_eq!(result.document.get_str("projectName"), Some("demo"));
    }

    #[test]
    fn test_missing_commas_between_lines() {
        let result = repaired("{\n  \"a\": 1\n  \"b\": [true false]\n}");
        assert_eq!(result.strategy, "insert-commas");
        assert_eq!(result.document.get("b"), Some(&serde_json::json!([true, false])));
    }

    #[test]
    fn test_truncated_document_is_closed() {
        let result = repaired("{\"projectName\": \"demo\", \"features\": {\"i18n\": true, \"ci\":");
        assert_eq!(result.strategy, "balance-brackets");
        assert_eq!(result.document.get("features").unwrap()["i18n"], true);
        assert!(result.document.get("features").unwrap()["ci"].is_null());
    }

    #[test]
    fn test_unterminated_string_is_closed() {
        let result = repaired("{\"projectName\": \"demo");
        assert_eq!(result.document.get_str("projectName"), Some("demo"));
    }

    #[test]
    fn test_stray_closer_is_dropped() {
        let result = repaired("{\"a\": [1, 2]]}");
        assert_eq!(result.document.get("a"), Some(&serde_json::json!([1, 2])));
    }

    #[test]
    fn test_hopeless_text_is_not_repaired() {
        assert!(repair("{ invalid").is_none());
        assert!(repair("[1, 2, 3").is_none());
        assert!(repair("just words").is_none());
    }
}

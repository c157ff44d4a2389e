//! Comment and trailing-comma stripping for JSON-with-comments text.
//!
//! Both passes track string literals (double or single quoted) so that `//`
//! inside a URL or a `,]` inside a string is left alone.

/// Strips comments and trailing commas, yielding text a strict JSON parser accepts
/// when the input was otherwise well formed.
pub fn normalize(input: &str) -> String {
    strip_trailing_commas(&strip_comments(input))
}

/// Removes `// line` and `/* block */` comments outside strings.
///
/// Line comments keep their terminating newline; block comments become a
/// single space so adjacent tokens stay separated.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for skipped in chars.by_ref() {
                    if previous == '*' && skipped == '/' {
                        break;
                    }
                    previous = skipped;
                }
                out.push(' ');
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Drops commas whose next significant character closes an object or array.
pub fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 1;
            } else if ch == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                out.push(ch);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_line_and_block_comments() {
        let text = "{\n  // heading\n  \"a\": 1, /* inline */ \"b\": 2\n}";
        let stripped = strip_comments(text);
        assert!(!stripped.contains("heading"));
        assert!(!stripped.contains("inline"));
        let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["b"], 2);
    }

    #[test]
    fn test_leaves_comment_markers_inside_strings() {
        let text = r#"{"url": "https://example.com/*x*/", "note": "a // b"}"#;
        assert_eq!(strip_comments(text), text);
    }

    #[test]
    fn test_removes_trailing_commas_only() {
        let text = r#"{"list": [1, 2, ], "s": "x,]", "o": {"k": true,},}"#;
        let normalized = strip_trailing_commas(text);
        assert_eq!(normalized, r#"{"list": [1, 2 ], "s": "x,]", "o": {"k": true}}"#);
    }

    #[test]
    fn test_escaped_quotes_do_not_end_strings() {
        let text = r#"{"a": "say \"hi\" // not a comment",}"#;
        let value: serde_json::Value = serde_json::from_str(&normalize(text)).unwrap();
        assert_eq!(value["a"], "say \"hi\" // not a comment");
    }
}

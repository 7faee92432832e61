// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! String-aware syntax repairs used by the later recovery stages.

/// Fix common model JSON mistakes:
///
/// - control characters other than newline and tab are dropped
/// - single-quoted strings become double-quoted
/// - raw newlines and tabs inside strings are escaped
/// - commas directly before `]` or `}` are removed
///
/// Text inside strings is otherwise left untouched.
pub fn repair(text: &str) -> String {
    let chars: Vec<char> = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) => match c {
                '\\' => match chars.get(i + 1) {
                    // `\'` is not a JSON escape.
                    Some('\'') => {
                        out.push('\'');
                        i += 1;
                    }
                    Some(&next) => {
                        out.push('\\');
                        out.push(next);
                        i += 1;
                    }
                    None => {}
                },
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '"' if q == '\'' => out.push_str("\\\""),
                _ if c == q => {
                    out.push('"');
                    quote = None;
                }
                _ => out.push(c),
            },
            None => match c {
                '"' | '\'' => {
                    out.push('"');
                    quote = Some(c);
                }
                ',' => {
                    let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
                    if !matches!(next, Some(']' | '}')) {
                        out.push(',');
                    }
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }

    out
}

/// Close a structure cut off mid-stream.
///
/// An open string is terminated, a dangling comma is dropped, a dangling
/// key separator gets a `null` value, and unmatched `[`/`{` are closed
/// innermost first. Expects double-quoted input (run [`repair`] first).
pub fn close_truncated(text: &str) -> String {
    let mut closers = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                closers.pop();
            }
            _ => {}
        }
    }

    let mut out = text.trim_end().to_string();
    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }

    loop {
        let len = out.trim_end().len();
        out.truncate(len);
        if !out.ends_with(',') {
            break;
        }
        out.pop();
    }
    if out.ends_with(':') {
        out.push_str(" null");
    }

    while let Some(closer) = closers.pop() {
        out.push(closer);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_leaves_string_contents_alone() {
        assert_eq!(repair(r#"{"a": "x, }", "b": [1,],}"#), r#"{"a": "x, }", "b": [1]}"#);
    }

    #[test]
    fn repair_converts_single_quotes_with_escaped_apostrophe() {
        assert_eq!(repair(r"{'a': 'it\'s'}"), r#"{"a": "it's"}"#);
    }

    #[test]
    fn close_nested_in_order() {
        assert_eq!(close_truncated(r#"{"a": [{"b": 1"#), r#"{"a": [{"b": 1}]}"#);
    }

    #[test]
    fn close_open_string_and_dangling_key() {
        assert_eq!(close_truncated(r#"{"a": "hel"#), r#"{"a": "hel"}"#);
        assert_eq!(close_truncated(r#"{"a":"#), r#"{"a": null}"#);
        assert_eq!(close_truncated("[1, 2, \n"), "[1, 2]");
    }
}

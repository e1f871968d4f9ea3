//! Value quoting rules shared by the line parser and the dump serializer.
//!
//! A raw value is either bare (`key = value ; comment`) or double-quoted
//! (`key = "va#lue" # comment`). Inside quotes `\"`, `\n` and `\\` are
//! escapes; the closing quote is the last `"` on the line.

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

const COMMENT_MARKERS: [char; 2] = ['#', ';'];

/// A value split from its trailing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unquoted {
    pub value: String,
    pub comment: String,
}

/// Unquote a raw value taken from the right-hand side of `=`.
///
/// Returns an error message when a quoted value has no closing quote.
pub fn unquote_value(raw: &str) -> Result<Unquoted, &'static str> {
    let v = raw.trim();
    let Some(quoted) = v.strip_prefix('"') else {
        return Ok(Unquoted {
            value: remove_trailing_comment(v).to_string(),
            comment: trailing_comment(v).to_string(),
        });
    };
    let end = quoted.rfind('"').ok_or("unclosed string")?;
    Ok(Unquoted {
        value: unescape(&quoted[..end]),
        comment: trailing_comment(&quoted[end + 1..]).to_string(),
    })
}

/// Quote `v` so that [`unquote_value`] reproduces it exactly.
///
/// Values free of newlines, comment markers and surrounding whitespace are
/// returned unchanged.
pub fn quote_value(v: &str) -> Cow<'_, str> {
    let needs_quotes = v.contains(|c: char| c == '\n' || COMMENT_MARKERS.contains(&c))
        || v.trim() != v
        || v.starts_with('"');
    if !needs_quotes {
        return Cow::Borrowed(v);
    }
    let mut out = String::with_capacity(v.len() + 2);
    out.push('"');
    for c in v.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('"');
    Cow::Owned(out)
}

/// Strip everything from the first `#` or `;` onward and trim.
pub fn remove_trailing_comment(v: &str) -> &str {
    match v.find(COMMENT_MARKERS) {
        Some(pos) => v[..pos].trim(),
        None => v.trim(),
    }
}

/// Text following the first `#` or `;`, or empty when there is none.
pub fn trailing_comment(v: &str) -> &str {
    match v.find(COMMENT_MARKERS) {
        Some(pos) => &v[pos + 1..],
        None => "",
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars: Peekable<Chars<'_>> = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mapped = match chars.peek() {
            Some('"') => '"',
            Some('n') => '\n',
            Some('\\') => '\\',
            _ => {
                out.push('\\');
                continue;
            }
        };
        chars.next();
        out.push(mapped);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_trailing_comments() {
        assert_eq!(remove_trailing_comment("v = v # test_comment"), "v = v");
        assert_eq!(remove_trailing_comment("v = v ; test_comment"), "v = v");
        assert_eq!(remove_trailing_comment("plain"), "plain");
    }

    #[test]
    fn test_trailing_comments() {
        assert_eq!(trailing_comment("v = v # test_comment"), " test_comment");
        assert_eq!(trailing_comment("v = v ; test_comment"), " test_comment");
        assert_eq!(trailing_comment("v = v"), "");
    }

    #[test]
    fn test_unquote_quoted_value_with_comment() {
        let got = unquote_value("\"val#;\\\"\\n\"    # test").unwrap();
        assert_eq!(got.value, "val#;\"\n");
        assert_eq!(got.comment, " test");
    }

    #[test]
    fn test_unquote_bare_value() {
        let got = unquote_value("  plain  ; trailing").unwrap();
        assert_eq!(got.value, "plain");
        assert_eq!(got.comment, " trailing");

        let got = unquote_value(" ; empty value").unwrap();
        assert_eq!(got.value, "");
        assert_eq!(got.comment, " empty value");

        assert_eq!(unquote_value("").unwrap().value, "");
        assert_eq!(unquote_value("a=b=c").unwrap().value, "a=b=c");
    }

    #[test]
    fn test_unquote_uses_last_quote() {
        let got = unquote_value("\"say \"hi\"\"").unwrap();
        assert_eq!(got.value, "say \"hi\"");
        assert_eq!(got.comment, "");
    }

    #[test]
    fn test_unclosed_quote_is_error() {
        assert_eq!(unquote_value("\"never closed"), Err("unclosed string"));
        assert_eq!(unquote_value("\""), Err("unclosed string"));
    }

    #[test]
    fn test_unknown_escape_kept_literally() {
        assert_eq!(unquote_value("\"C:\\temp\"").unwrap().value, "C:\\temp");
    }

    #[test]
    fn test_quote_leaves_plain_values_alone() {
        for v in ["", "plain", "a=b", "with inner space", "multi,var|12345", "a\\nb"] {
            assert!(matches!(quote_value(v), Cow::Borrowed(_)), "{:?} was quoted", v);
        }
    }

    #[test]
    fn test_quote_unquote_round_trip() {
        let values = [
            "val#1\n\\\"\nx",
            "semi;colon",
            "hash#tag",
            "line1\nline2",
            " leading",
            "trailing ",
            "\"starts with quote",
            "back\\slash#",
            "\\n literal#",
        ];
        for v in values {
            let quoted = quote_value(v);
            assert!(quoted.starts_with('"'), "{:?} should be quoted", v);
            let line = format!("{}  # usage", quoted);
            assert_eq!(unquote_value(&line).unwrap().value, v);
        }
    }
}

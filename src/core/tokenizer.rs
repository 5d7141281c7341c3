//! Tokenizer for console command lines.
//!
//! Splits argument text into whitespace-separated tokens with support for
//! double-quoted strings and backslash escapes. No external dependencies.

use std::ops::Range;

/// Split raw argument text into tokens.
///
/// # Syntax
///
/// - Tokens are separated by runs of whitespace outside quotes
/// - A `"` toggles quoted mode; quote characters are not part of the token
/// - `\"` and `\\` produce a literal `"` and `\`; any other backslash is kept
/// - An unterminated quote closes at end of input
/// - A quoted empty string (`""`) produces an empty token
///
/// # Examples
///
/// ```
/// use bevy_dev_console::core::tokenize;
///
/// assert_eq!(tokenize(r#"a "b c" d"#), vec!["a", "b c", "d"]);
/// assert_eq!(tokenize(r#""a\"b""#), vec![r#"a"b"#]);
/// assert!(tokenize("   ").is_empty());
/// ```
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    // A token exists once anything (even just a pair of quotes) was seen.
    let mut has_token = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                match chars.peek() {
                    Some(&next) if next == '"' || next == '\\' => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push('\\'),
                }
                has_token = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        tokens.push(current);
    }

    tokens
}

/// Rebuild "everything from token `start` onwards" as free text.
///
/// With `start == 0` the raw text is returned untouched. Otherwise the
/// remaining tokens are joined with single spaces; the original quoting and
/// spacing are not reproduced.
pub fn get_remainder(raw: &str, tokens: &[String], start: usize) -> String {
    if start == 0 {
        return raw.to_string();
    }
    tokens.get(start..).unwrap_or(&[]).join(" ")
}

/// Split a command line into the command name and the raw argument text.
///
/// The name ends at the first whitespace run; the remainder starts after it.
/// Returns `None` for empty or whitespace-only lines.
///
/// # Examples
///
/// ```
/// use bevy_dev_console::core::split_command_line;
///
/// assert_eq!(split_command_line("  say   hello  world "), Some(("say", "hello  world")));
/// assert_eq!(split_command_line("quit"), Some(("quit", "")));
/// assert_eq!(split_command_line("   "), None);
/// ```
pub fn split_command_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.find(char::is_whitespace) {
        Some(end) => Some((&trimmed[..end], trimmed[end..].trim_start())),
        None => Some((trimmed, "")),
    }
}

/// Byte range of the first whitespace-delimited token of `text`.
///
/// For text without a token the range is empty and sits after any leading
/// whitespace.
pub fn first_token_range(text: &str) -> Range<usize> {
    let start = text.len() - text.trim_start().len();
    let end = text[start..]
        .find(char::is_whitespace)
        .map_or(text.len(), |len| start + len);
    start..end
}

/// The first whitespace-delimited token of `text`, or `""`.
#[inline]
pub fn first_token(text: &str) -> &str {
    &text[first_token_range(text)]
}

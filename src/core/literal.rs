// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Restricted literal grammar for directive arguments.
//!
//! Only four token shapes are accepted: signed integers (decimal or
//! `0x`/`0o`/`0b` prefixed, `_` separators allowed), quoted text, bracketed
//! integer lists, and bare runs of instruction symbols which evaluate to text.
//! Nothing is ever executed.

use crate::core::emit::is_instruction;
use crate::core::text_utils::Cursor;
use crate::core::value::Value;

/// Error returned when an argument token is not a recognized literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub message: String,
    /// Byte offset in the source line where the bad token starts.
    pub offset: usize,
}

impl LiteralError {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl std::fmt::Display for LiteralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LiteralError {}

/// Evaluate one raw argument token. `offset` is the token's byte offset in
/// its line and is only used for error positions.
pub fn evaluate(token: &str, offset: usize) -> Result<Value, LiteralError> {
    if token.is_empty() {
        return Err(LiteralError::new("Empty argument", offset));
    }
    if let Some(value) = parse_int(token) {
        return Ok(Value::Int(value));
    }
    match token.chars().next() {
        Some(quote @ ('"' | '\'')) => parse_quoted(token, quote, offset).map(Value::Text),
        Some('[') => match parse_int_list(token) {
            Some(values) => Ok(Value::IntList(values)),
            None if is_instruction_text(token) => Ok(Value::Text(token.to_string())),
            None => Err(LiteralError::new(
                format!("Invalid integer list: {token}"),
                offset,
            )),
        },
        _ if is_instruction_text(token) => Ok(Value::Text(token.to_string())),
        _ => Err(LiteralError::new(
            format!("Unrecognized literal: {token}"),
            offset,
        )),
    }
}

fn is_instruction_text(token: &str) -> bool {
    token.chars().all(is_instruction)
}

/// Parse a signed integer literal. Returns `None` for anything that is not
/// entirely an integer, including a bare sign.
pub fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    };
    if !digits.starts_with(|ch: char| ch.is_ascii_digit()) || digits.ends_with('_') {
        return None;
    }
    let digits: String = digits.chars().filter(|&ch| ch != '_').collect();
    let digits = digits.as_str();
    let (radix, body) = if let Some(hex) = strip_prefix_ci(digits, "0x") {
        (16, hex)
    } else if let Some(oct) = strip_prefix_ci(digits, "0o") {
        (8, oct)
    } else if let Some(bin) = strip_prefix_ci(digits, "0b") {
        (2, bin)
    } else {
        (10, digits)
    };
    if body.is_empty() || !body.chars().all(|ch| ch.is_digit(radix)) {
        return None;
    }
    let magnitude = i64::from_str_radix(body, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn parse_int_list(token: &str) -> Option<Vec<i64>> {
    let inner = token.strip_prefix('[')?.strip_suffix(']')?;
    let inner = inner.trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    let inner = inner.strip_suffix(',').unwrap_or(inner);
    inner
        .split(',')
        .map(|item| parse_int(item.trim()))
        .collect()
}

fn parse_quoted(token: &str, quote: char, offset: usize) -> Result<String, LiteralError> {
    let mut cursor = Cursor::new(token);
    cursor.next();
    let mut out = String::new();
    loop {
        let Some(ch) = cursor.next() else {
            return Err(LiteralError::new("Unterminated string literal", offset));
        };
        if ch == quote {
            break;
        }
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let escape_at = offset + cursor.pos() - 1;
        let resolved = match cursor.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('x') => {
                let hex: String = (0..2).filter_map(|_| cursor.next()).collect();
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) if byte <= 0x7f && hex.len() == 2 => char::from(byte),
                    _ => {
                        return Err(LiteralError::new(
                            format!("Invalid \\x escape: \\x{hex}"),
                            escape_at,
                        ))
                    }
                }
            }
            Some(other) => {
                return Err(LiteralError::new(
                    format!("Unknown escape sequence: \\{other}"),
                    escape_at,
                ))
            }
            None => return Err(LiteralError::new("Unterminated string literal", offset)),
        };
        out.push(resolved);
    }
    if !cursor.is_eof() {
        return Err(LiteralError::new(
            format!("Unexpected text after string literal: {}", cursor.rest()),
            offset + cursor.pos(),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn integers_accept_sign_prefix_and_separators() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-7"), Some(-7));
        assert_eq!(parse_int("+3"), Some(3));
        assert_eq!(parse_int("0x2A"), Some(42));
        assert_eq!(parse_int("-0b101"), Some(-5));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("1_000"), Some(1000));
    }

    #[test]
    fn integers_reject_partial_matches() {
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("--5"), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("12a"), None);
        assert_eq!(parse_int("1_"), None);
        assert_eq!(parse_int("_1"), None);
    }

    #[test]
    fn bare_instruction_runs_are_text() {
        assert_eq!(evaluate("++", 0), Ok(Value::Text("++".into())));
        assert_eq!(evaluate("-", 0), Ok(Value::Text("-".into())));
        assert_eq!(evaluate("[-]", 0), Ok(Value::Text("[-]".into())));
        assert_eq!(evaluate(">[->+<]<", 0), Ok(Value::Text(">[->+<]<".into())));
    }

    #[test]
    fn bracketed_integers_are_lists() {
        assert_eq!(evaluate("[1,2,3]", 0), Ok(Value::IntList(vec![1, 2, 3])));
        assert_eq!(evaluate("[ -1, 0x10, ]", 0), Ok(Value::IntList(vec![-1, 16])));
        assert_eq!(evaluate("[]", 0), Ok(Value::IntList(Vec::new())));
    }

    #[test]
    fn quoted_text_resolves_escapes() {
        assert_eq!(evaluate("\"hi\\n\"", 0), Ok(Value::Text("hi\n".into())));
        assert_eq!(evaluate("'a\"b'", 0), Ok(Value::Text("a\"b".into())));
        assert_eq!(evaluate("\"\\x41\\t\"", 0), Ok(Value::Text("A\t".into())));
        assert_eq!(evaluate("\"\"", 0), Ok(Value::Text(String::new())));
    }

    #[test]
    fn malformed_literals_report_their_offset() {
        let err = evaluate("foo", 9).expect_err("identifier is not a literal");
        assert_eq!(err.offset, 9);
        assert!(err.message.contains("foo"));

        let err = evaluate("\"open", 3).expect_err("unterminated");
        assert_eq!(err.message, "Unterminated string literal");

        let err = evaluate("\"a\\qb\"", 10).expect_err("unknown escape");
        assert_eq!(err.offset, 12);

        let err = evaluate("[1,x]", 0).expect_err("bad list");
        assert!(err.message.starts_with("Invalid integer list"));

        assert!(evaluate("\"a\"b", 0).is_err());
        assert!(evaluate("__import__('os')", 0).is_err());
    }

    proptest! {
        #[test]
        fn decimal_integers_evaluate_to_themselves(value in any::<i32>()) {
            let text = value.to_string();
            prop_assert_eq!(evaluate(&text, 0), Ok(Value::Int(value as i64)));
        }

        #[test]
        fn quoted_printable_ascii_round_trips(text in "[a-zA-Z0-9 ,.!?]{0,24}") {
            let token = format!("\"{text}\"");
            prop_assert_eq!(evaluate(&token, 0), Ok(Value::Text(text)));
        }
    }
}

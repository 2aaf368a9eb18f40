// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Directive scanner: finds the first `(name arg ...)` span on a line and
//! evaluates its arguments.

use crate::core::literal::{evaluate, LiteralError};
use crate::core::text_utils::Cursor;
use crate::core::value::Directive;

/// Result of scanning one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// The line has no `(`.
    Plain,
    /// A `(` opens at this byte offset but is never closed.
    Unterminated { open: usize },
    Found {
        directive: Directive,
        /// Byte offset of another `(` after the expanded span, if any.
        ignored: Option<usize>,
    },
}

/// Scan `line` (without its terminator) for the first directive.
pub fn scan_line(line: &str) -> Result<Scan, LiteralError> {
    let Some(open) = line.find('(') else {
        return Ok(Scan::Plain);
    };
    let Some(close) = matching_paren(line, open) else {
        return Ok(Scan::Unterminated { open });
    };
    let directive = parse_directive(line, open, close)?;
    let ignored = line[close + 1..].find('(').map(|idx| close + 1 + idx);
    Ok(Scan::Found { directive, ignored })
}

/// Byte offset of the `)` closing the `(` at `open`. Parentheses inside
/// quoted text do not count.
fn matching_paren(line: &str, open: usize) -> Option<usize> {
    let mut cursor = Cursor::with_pos(line, open);
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    while let Some(ch) = cursor.next() {
        if let Some(q) = quote {
            if ch == '\\' {
                cursor.next();
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(cursor.pos() - 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_directive(line: &str, open: usize, close: usize) -> Result<Directive, LiteralError> {
    let body_start = open + 1;
    let body = &line[body_start..close];
    let mut cursor = Cursor::new(body);
    cursor.skip_ws();
    let name = cursor.take_while(|ch| !ch.is_whitespace());
    if name.is_empty() {
        return Err(LiteralError::new("Directive name is missing", open));
    }
    let args = split_args(body, cursor.pos())
        .into_iter()
        .map(|(token, start)| evaluate(token, body_start + start))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Directive {
        name: name.to_string(),
        args,
        span: open..close + 1,
    })
}

/// Split argument text into raw tokens with their byte offsets. Whitespace
/// inside quotes or inside `[ ]` does not separate tokens.
fn split_args(body: &str, from: usize) -> Vec<(&str, usize)> {
    let mut cursor = Cursor::with_pos(body, from);
    let mut tokens = Vec::new();
    loop {
        cursor.skip_ws();
        if cursor.is_eof() {
            break;
        }
        let start = cursor.pos();
        let mut brackets = 0usize;
        let mut quote: Option<char> = None;
        while let Some(ch) = cursor.peek() {
            if quote.is_none() && brackets == 0 && ch.is_whitespace() {
                break;
            }
            cursor.next();
            match (quote, ch) {
                (Some(_), '\\') => {
                    cursor.next();
                }
                (Some(q), _) if ch == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(ch),
                (None, '[') => brackets += 1,
                (None, ']') => brackets = brackets.saturating_sub(1),
                (None, _) => {}
            }
        }
        tokens.push((&body[start..cursor.pos()], start));
    }
    tokens
}

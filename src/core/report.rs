// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Source-line highlighting shared by diagnostic rendering.

/// Highlight the 1-based character columns `col_start..=col_end` of `line`.
/// Without colour the line is returned unchanged; a column past the end of
/// the line gets a trailing caret.
pub fn highlight_span(
    line: &str,
    col_start: Option<usize>,
    col_end: Option<usize>,
    use_color: bool,
) -> String {
    let Some(start) = col_start.filter(|col| *col > 0) else {
        return line.to_string();
    };
    let end = col_end.unwrap_or(start).max(start);
    let width = line.chars().count();
    if start > width {
        if use_color {
            return format!("{line}\x1b[31m^\x1b[0m");
        }
        return format!("{line}^");
    }
    if !use_color {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + 9);
    for (idx, ch) in line.chars().enumerate() {
        let col = idx + 1;
        if col == start {
            out.push_str("\x1b[31m");
        }
        out.push(ch);
        if col == end.min(width) {
            out.push_str("\x1b[0m");
        }
    }
    out
}

// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Instruction primitives.
//!
//! Every generator is built from these two runs plus fixed loop/IO symbols,
//! so `displace(n) + displace(-n)` and `delta(n) + delta(-n)` being identities
//! on the tape is what keeps composed sequences pointer-neutral.

/// The eight symbols a generated instruction sequence may contain.
pub const INSTRUCTION_ALPHABET: [char; 8] = ['>', '<', '+', '-', '.', ',', '[', ']'];

pub fn is_instruction(ch: char) -> bool {
    INSTRUCTION_ALPHABET.contains(&ch)
}

/// Minimal pointer movement: `n` times `>` for positive `n`, `|n|` times `<`
/// for negative `n`, nothing for zero.
pub fn displace(n: i64) -> String {
    run('>', '<', n)
}

/// Minimal cell adjustment: `n` times `+` for positive `n`, `|n|` times `-`
/// for negative `n`, nothing for zero.
pub fn delta(n: i64) -> String {
    run('+', '-', n)
}

fn run(up: char, down: char, n: i64) -> String {
    let count = n.unsigned_abs() as usize;
    let symbol = if n < 0 { down } else { up };
    std::iter::repeat(symbol).take(count).collect()
}

/// True when every `[` in `code` has a matching `]` after it.
pub fn is_balanced(code: &str) -> bool {
    let mut depth = 0usize;
    for ch in code.chars() {
        match ch {
            '[' => depth += 1,
            ']' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    depth == 0
}

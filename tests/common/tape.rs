// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Minimal 8-bit brainfuck machine for checking what generated code does.

use std::collections::BTreeMap;

const STEP_LIMIT: usize = 1_000_000;

#[derive(Debug, Default)]
pub struct Tape {
    cells: BTreeMap<i64, u8>,
    pub pointer: i64,
    pub output: Vec<u8>,
    input: Vec<u8>,
    input_pos: usize,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.to_vec(),
            ..Self::default()
        }
    }

    /// Preload a cell relative to the starting position.
    pub fn set(&mut self, offset: i64, value: u8) -> &mut Self {
        self.cells.insert(offset, value);
        self
    }

    pub fn get(&self, offset: i64) -> u8 {
        self.cells.get(&offset).copied().unwrap_or(0)
    }

    /// Offsets holding a nonzero value.
    pub fn nonzero(&self) -> Vec<(i64, u8)> {
        self.cells
            .iter()
            .filter(|(_, value)| **value != 0)
            .map(|(offset, value)| (*offset, *value))
            .collect()
    }

    pub fn run(&mut self, code: &str) -> Result<(), String> {
        let program: Vec<char> = code.chars().collect();
        let jumps = match_brackets(&program)?;
        let mut pc = 0;
        let mut steps = 0;
        while pc < program.len() {
            steps += 1;
            if steps > STEP_LIMIT {
                return Err(format!("step limit exceeded at {pc}"));
            }
            let cell = self.cells.entry(self.pointer).or_insert(0);
            match program[pc] {
                '>' => self.pointer += 1,
                '<' => self.pointer -= 1,
                '+' => *cell = cell.wrapping_add(1),
                '-' => *cell = cell.wrapping_sub(1),
                '.' => self.output.push(*cell),
                ',' => {
                    *cell = self.input.get(self.input_pos).copied().unwrap_or(0);
                    self.input_pos += 1;
                }
                '[' if *cell == 0 => pc = jumps[pc],
                ']' if *cell != 0 => pc = jumps[pc],
                _ => {}
            }
            pc += 1;
        }
        Ok(())
    }
}

fn match_brackets(program: &[char]) -> Result<Vec<usize>, String> {
    let mut jumps = vec![0; program.len()];
    let mut stack = Vec::new();
    for (idx, ch) in program.iter().enumerate() {
        match ch {
            '[' => stack.push(idx),
            ']' => {
                let open = stack.pop().ok_or_else(|| format!("unmatched ] at {idx}"))?;
                jumps[open] = idx;
                jumps[idx] = open;
            }
            _ => {}
        }
    }
    match stack.pop() {
        Some(open) => Err(format!("unmatched [ at {open}")),
        None => Ok(jumps),
    }
}

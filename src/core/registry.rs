// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Directive registry.
//!
//! Maps directive names to generators. The registry is filled once at
//! startup (see `registry_defaults`) and only read afterwards; dispatch
//! always checks the generator's signature and the configured limits before
//! any code is generated.

use std::collections::HashMap;

use tracing::debug;

use crate::core::generators::{GenError, Generator};
use crate::core::value::{Directive, Value};

pub const DEFAULT_MAX_RUN: u64 = 1 << 16;
pub const DEFAULT_CELL_BITS: u32 = 8;

/// Bounds applied to arguments before a generator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest magnitude accepted for any integer argument or list element.
    pub max_run: u64,
    /// Width of a tape cell; `print` rejects code points that do not fit.
    pub cell_bits: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_run: DEFAULT_MAX_RUN,
            cell_bits: DEFAULT_CELL_BITS,
        }
    }
}

impl Limits {
    fn max_cell_value(&self) -> u64 {
        if self.cell_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.cell_bits) - 1
        }
    }

    fn check(&self, generator: Generator, args: &[Value]) -> Result<(), GenError> {
        let too_large = |value: i64| value.unsigned_abs() > self.max_run;
        for arg in args {
            let offending = match arg {
                Value::Int(value) => Some(*value).filter(|v| too_large(*v)),
                Value::IntList(values) => values.iter().copied().find(|v| too_large(*v)),
                Value::Text(_) => None,
            };
            if let Some(value) = offending {
                return Err(GenError::InvalidArgument {
                    directive: generator.name().to_string(),
                    message: format!(
                        "argument {value} exceeds the maximum run length {}",
                        self.max_run
                    ),
                });
            }
        }
        if generator == Generator::PrintString {
            let max = self.max_cell_value();
            let text = args.first().and_then(Value::as_text).unwrap_or_default();
            if let Some(ch) = text.chars().find(|&ch| u64::from(ch as u32) > max) {
                return Err(GenError::InvalidArgument {
                    directive: generator.name().to_string(),
                    message: format!(
                        "character {ch:?} (U+{:04X}) does not fit a {}-bit cell",
                        ch as u32, self.cell_bits
                    ),
                });
            }
        }
        Ok(())
    }
}

pub struct Registry {
    generators: HashMap<&'static str, Generator>,
    limits: Limits,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Registry {
    pub fn new(limits: Limits) -> Self {
        Self {
            generators: HashMap::new(),
            limits,
        }
    }

    pub fn register(&mut self, generator: Generator) {
        self.generators.insert(generator.name(), generator);
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn lookup(&self, name: &str) -> Result<Generator, GenError> {
        self.generators
            .get(name)
            .copied()
            .ok_or_else(|| GenError::UnknownDirective {
                name: name.to_string(),
            })
    }

    /// Registered directive names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.generators.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Closest registered name within edit distance 2, for "did you mean".
    pub fn suggest(&self, name: &str) -> Option<&'static str> {
        self.names()
            .into_iter()
            .map(|candidate| (edit_distance(name, candidate), candidate))
            .filter(|(distance, _)| *distance <= 2)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| candidate)
    }

    /// Expand a directive: lookup, signature check, limit check, generate.
    pub fn dispatch(&self, directive: &Directive) -> Result<String, GenError> {
        let generator = self.lookup(&directive.name)?;
        generator.check_signature(&directive.args)?;
        self.limits.check(generator, &directive.args)?;
        let code = generator.generate(&directive.args)?;
        debug!(
            directive = generator.name(),
            emitted = code.len(),
            "directive expanded"
        );
        Ok(code)
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut row = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != *cb);
            row[j + 1] = substitute.min(prev[j + 1] + 1).min(row[j] + 1);
        }
        prev = row;
    }
    prev[b.len()]
}

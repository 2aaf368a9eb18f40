// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The directive generator set.
//!
//! Each generator turns typed arguments into an instruction sequence that,
//! unless noted otherwise, returns the tape pointer to the cell it started
//! on. Directives compose by plain concatenation, so a generator that leaves
//! the pointer elsewhere shifts every directive after it.

use std::fmt;

use crate::core::emit::{delta, displace, is_balanced, is_instruction};
use crate::core::value::{format_kinds, Value, ValueKind};

/// Error produced when a directive cannot be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    UnknownDirective {
        name: String,
    },
    ArityOrTypeMismatch {
        directive: String,
        expected: Vec<ValueKind>,
        found: Vec<ValueKind>,
    },
    InvalidArgument {
        directive: String,
        message: String,
    },
}

impl GenError {
    fn invalid(generator: Generator, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            directive: generator.name().to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDirective { name } => write!(f, "directive \"{name}\" does not exist"),
            Self::ArityOrTypeMismatch {
                directive,
                expected,
                found,
            } => write!(
                f,
                "directive \"{directive}\" expects arguments {}, found {}",
                format_kinds(expected),
                format_kinds(found)
            ),
            Self::InvalidArgument { directive, message } => {
                write!(f, "directive \"{directive}\": {message}")
            }
        }
    }
}

impl std::error::Error for GenError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Rightward for pointer moves, upward for cell values.
    Forward,
    Backward,
}

impl Direction {
    fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Where the cursor sits relative to the array when navigation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// On the cell just outside the array; ends on the far terminator.
    Outside,
    /// On an array cell; ends on the last nonzero cell before the terminator.
    Inside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generator {
    Displace(Direction),
    Delta(Direction),
    PrintString,
    ReadBytes,
    Move,
    Copy,
    If,
    IfElse,
    MakeArray,
    ArrayNav(Direction, Side),
}

impl Generator {
    /// Every generator, in registration order.
    pub const ALL: [Generator; 15] = [
        Generator::Delta(Direction::Forward),
        Generator::Delta(Direction::Backward),
        Generator::Displace(Direction::Forward),
        Generator::Displace(Direction::Backward),
        Generator::PrintString,
        Generator::ReadBytes,
        Generator::Move,
        Generator::Copy,
        Generator::If,
        Generator::IfElse,
        Generator::MakeArray,
        Generator::ArrayNav(Direction::Forward, Side::Outside),
        Generator::ArrayNav(Direction::Backward, Side::Outside),
        Generator::ArrayNav(Direction::Forward, Side::Inside),
        Generator::ArrayNav(Direction::Backward, Side::Inside),
    ];

    /// Directive name this generator is registered under.
    pub fn name(self) -> &'static str {
        match self {
            Generator::Delta(Direction::Forward) => "+",
            Generator::Delta(Direction::Backward) => "-",
            Generator::Displace(Direction::Forward) => ">",
            Generator::Displace(Direction::Backward) => "<",
            Generator::PrintString => "print",
            Generator::ReadBytes => "read_bytes",
            Generator::Move => "mv",
            Generator::Copy => "cp",
            Generator::If => "if",
            Generator::IfElse => "ifelse",
            Generator::MakeArray => "make_arr",
            Generator::ArrayNav(Direction::Forward, Side::Outside) => "arr_end_bd",
            Generator::ArrayNav(Direction::Backward, Side::Outside) => "arr_beg_bd",
            Generator::ArrayNav(Direction::Forward, Side::Inside) => "arr_end_in",
            Generator::ArrayNav(Direction::Backward, Side::Inside) => "arr_beg_in",
        }
    }

    pub fn signature(self) -> &'static [ValueKind] {
        use ValueKind::*;
        match self {
            Generator::Displace(_)
            | Generator::Delta(_)
            | Generator::ReadBytes
            | Generator::Move
            | Generator::Copy => &[Int],
            Generator::PrintString | Generator::If => &[Text],
            Generator::IfElse => &[Text, Text, Int],
            Generator::MakeArray => &[IntList],
            Generator::ArrayNav(..) => &[],
        }
    }

    /// Whether the sequence returns the pointer to its entry cell.
    pub fn is_pointer_neutral(self) -> bool {
        !matches!(self, Generator::ReadBytes)
    }

    pub fn check_signature(self, args: &[Value]) -> Result<(), GenError> {
        let expected = self.signature();
        let matches = args.len() == expected.len()
            && args.iter().zip(expected).all(|(arg, kind)| arg.kind() == *kind);
        if matches {
            Ok(())
        } else {
            Err(GenError::ArityOrTypeMismatch {
                directive: self.name().to_string(),
                expected: expected.to_vec(),
                found: args.iter().map(Value::kind).collect(),
            })
        }
    }

    pub fn generate(self, args: &[Value]) -> Result<String, GenError> {
        self.check_signature(args)?;
        match self {
            Generator::Displace(direction) => {
                Ok(displace(int_arg(args, 0).saturating_mul(direction.sign())))
            }
            Generator::Delta(direction) => {
                Ok(delta(int_arg(args, 0).saturating_mul(direction.sign())))
            }
            Generator::PrintString => Ok(print_string(text_arg(args, 0))),
            Generator::ReadBytes => read_bytes(int_arg(args, 0)),
            Generator::Move => move_value(int_arg(args, 0)),
            Generator::Copy => copy_value(int_arg(args, 0)),
            Generator::If => conditional(text_arg(args, 0)),
            Generator::IfElse => {
                conditional_else(text_arg(args, 0), text_arg(args, 1), int_arg(args, 2))
            }
            Generator::MakeArray => Ok(make_array(list_arg(args, 0))),
            Generator::ArrayNav(direction, side) => Ok(array_nav(direction, side).to_string()),
        }
    }
}

// Accessors below run after `check_signature`, so the fallbacks are unreachable.
fn int_arg(args: &[Value], idx: usize) -> i64 {
    args.get(idx).and_then(Value::as_int).unwrap_or_default()
}

fn text_arg(args: &[Value], idx: usize) -> &str {
    args.get(idx).and_then(Value::as_text).unwrap_or_default()
}

fn list_arg(args: &[Value], idx: usize) -> &[i64] {
    args.get(idx).and_then(Value::as_list).unwrap_or_default()
}

/// Raise the cell to each character's code point, output it, lower it back.
pub fn print_string(text: &str) -> String {
    let mut code = String::new();
    for ch in text.chars() {
        let point = ch as i64;
        code.push_str(&delta(point));
        code.push('.');
        code.push_str(&delta(-point));
    }
    code
}

/// Fill `n` cells from input, left to right. Leaves the pointer `n` cells
/// to the right of where it started.
pub fn read_bytes(n: i64) -> Result<String, GenError> {
    if n < 0 {
        return Err(GenError::invalid(
            Generator::ReadBytes,
            format!("byte count must not be negative (got {n})"),
        ));
    }
    Ok(",>".repeat(n as usize))
}

/// Drain the current cell into the cell `n` away.
pub fn move_value(n: i64) -> Result<String, GenError> {
    if n == 0 {
        return Err(GenError::invalid(
            Generator::Move,
            "destination offset 0 is the source cell",
        ));
    }
    Ok(format!("[-{}+{}]", displace(n), displace(n.saturating_neg())))
}

/// Add the current cell to the cell `n` away, using `n + 1` as scratch.
pub fn copy_value(n: i64) -> Result<String, GenError> {
    match n {
        0 => {
            return Err(GenError::invalid(
                Generator::Copy,
                "destination offset 0 is the source cell",
            ))
        }
        -1 => {
            return Err(GenError::invalid(
                Generator::Copy,
                "scratch cell at offset 0 is the source cell",
            ))
        }
        _ => {}
    }
    let scratch = n.checked_add(1).ok_or_else(|| {
        GenError::invalid(Generator::Copy, "scratch offset does not fit an integer")
    })?;
    let mut code = format!("[-{}+>+{}]", displace(n), displace(-scratch));
    code.push_str(&displace(scratch));
    code.push_str(&format!("[-{}+{}]", displace(-scratch), displace(scratch)));
    code.push_str(&displace(-scratch));
    Ok(code)
}

fn check_body(generator: Generator, role: &str, body: &str) -> Result<(), GenError> {
    if let Some(bad) = body.chars().find(|&ch| !is_instruction(ch)) {
        return Err(GenError::invalid(
            generator,
            format!("{role} contains non-instruction character {bad:?}"),
        ));
    }
    if !is_balanced(body) {
        return Err(GenError::invalid(
            generator,
            format!("{role} has unbalanced brackets"),
        ));
    }
    Ok(())
}

/// Run `body` once if the current cell is nonzero; the cell ends at zero.
pub fn conditional(body: &str) -> Result<String, GenError> {
    check_body(Generator::If, "body", body)?;
    Ok(format!("[{body}[-]]"))
}

/// Run exactly one of `if_body` / `else_body` depending on the current cell,
/// using the cell `tmp` away as the else flag.
pub fn conditional_else(if_body: &str, else_body: &str, tmp: i64) -> Result<String, GenError> {
    check_body(Generator::IfElse, "if body", if_body)?;
    check_body(Generator::IfElse, "else body", else_body)?;
    if tmp == 0 {
        return Err(GenError::invalid(
            Generator::IfElse,
            "flag offset 0 is the condition cell",
        ));
    }
    let to_flag = displace(tmp);
    let to_cond = displace(tmp.saturating_neg());
    let mut code = format!("{to_flag}[-]+{to_cond}");
    code.push_str(&format!("[{if_body}[-]{to_flag}-{to_cond}]"));
    code.push_str(&to_flag);
    code.push_str(&format!("[{to_cond}{else_body}{to_flag}-]"));
    code.push_str(&to_cond);
    Ok(code)
}

/// Write `values` into the cells right of the current one and come back.
pub fn make_array(values: &[i64]) -> String {
    let mut code = String::from(">");
    for &value in values {
        code.push_str(&delta(value));
        code.push('>');
    }
    code.push_str(&displace(-(values.len() as i64) - 1));
    code
}

pub fn array_nav(direction: Direction, side: Side) -> &'static str {
    match (direction, side) {
        (Direction::Forward, Side::Outside) => ">[>]",
        (Direction::Backward, Side::Outside) => "<[<]",
        (Direction::Forward, Side::Inside) => "[>]<",
        (Direction::Backward, Side::Inside) => "[<]>",
    }
}

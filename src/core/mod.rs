// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Directive expansion core.
//!
//! - [`emit`] - Pointer and cell-value instruction runs
//! - [`generators`] - The directive code generators
//! - [`registry`] - Name to generator dispatch
//! - [`directive`] - Directive scanning on a source line
//! - [`literal`] - Argument literal grammar
//! - [`error`] - Error types and diagnostics

pub mod directive;
pub mod emit;
pub mod error;
pub mod generators;
pub mod literal;
pub mod registry;
pub mod report;
pub mod text_utils;
pub mod value;

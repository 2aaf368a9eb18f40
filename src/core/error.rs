// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types, diagnostics, and run reports for the preprocessor.

use std::fmt;
use std::sync::Arc;

use crate::core::generators::GenError;
use crate::core::report::highlight_span;

/// Categories of preprocessor errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpErrorKind {
    Cli,
    Io,
    Literal,
    Unterminated,
    IgnoredDirective,
    UnknownDirective,
    Signature,
    InvalidArgument,
}

/// A preprocessor error with a kind and message.
#[derive(Debug, Clone)]
pub struct PpError {
    kind: PpErrorKind,
    message: String,
}

impl PpError {
    pub fn new(kind: PpErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> PpErrorKind {
        self.kind
    }
}

impl From<&GenError> for PpError {
    fn from(err: &GenError) -> Self {
        let kind = match err {
            GenError::UnknownDirective { .. } => PpErrorKind::UnknownDirective,
            GenError::ArityOrTypeMismatch { .. } => PpErrorKind::Signature,
            GenError::InvalidArgument { .. } => PpErrorKind::InvalidArgument,
        };
        Self::new(kind, &err.to_string(), None)
    }
}

impl fmt::Display for PpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PpError {}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// A diagnostic message tied to a source line.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub(crate) line: u32,
    pub(crate) column: Option<usize>,
    pub(crate) col_end: Option<usize>,
    pub(crate) code: String,
    pub(crate) severity: Severity,
    pub(crate) error: PpError,
    pub(crate) file: Option<String>,
    pub(crate) help: Vec<String>,
}

impl Diagnostic {
    pub fn new(line: u32, severity: Severity, error: PpError) -> Self {
        Self {
            line,
            column: None,
            col_end: None,
            code: default_diagnostic_code(error.kind()).to_string(),
            severity,
            error,
            file: None,
            help: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Option<usize>) -> Self {
        self.column = column;
        self
    }

    pub fn with_col_end(mut self, col_end: Option<usize>) -> Self {
        self.col_end = col_end;
        self
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    pub fn format(&self) -> String {
        format!(
            "{}: {} [{}] - {}",
            self.line,
            self.severity.label(),
            self.code,
            self.error.message()
        )
    }

    pub fn format_with_context(&self, lines: Option<&[String]>, use_color: bool) -> String {
        let sev = self.severity.label();
        let header = match &self.file {
            Some(file) => format!("{file}:{}: {sev} [{}]", self.line, self.code),
            None => format!("{}: {sev} [{}]", self.line, self.code),
        };

        let mut out = String::new();
        out.push_str(&header);
        out.push('\n');
        for line in build_context_lines(self.line, self.column, self.col_end, lines, use_color) {
            out.push_str(&line);
            out.push('\n');
        }
        for help in &self.help {
            out.push_str("help: ");
            out.push_str(help);
            out.push('\n');
        }
        out.push_str(&format!("{sev}: {}", self.error.message()));
        out
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn col_end(&self) -> Option<usize> {
        self.col_end
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn message(&self) -> &str {
        self.error.message()
    }

    pub fn kind(&self) -> PpErrorKind {
        self.error.kind()
    }

    pub fn help(&self) -> &[String] {
        &self.help
    }
}

/// Report from a successful preprocessing run.
#[derive(Debug)]
pub struct PpRunReport {
    output: String,
    diagnostics: Vec<Diagnostic>,
    source_lines: Arc<Vec<String>>,
}

impl PpRunReport {
    pub fn new(
        output: String,
        diagnostics: Vec<Diagnostic>,
        source_lines: impl Into<Arc<Vec<String>>>,
    ) -> Self {
        Self {
            output,
            diagnostics,
            source_lines: source_lines.into(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Error from a failed run. Still carries the output produced with every
/// failing directive left verbatim.
#[derive(Debug)]
pub struct PpRunError {
    error: PpError,
    output: Option<String>,
    diagnostics: Vec<Diagnostic>,
    source_lines: Arc<Vec<String>>,
}

impl PpRunError {
    pub fn new(
        error: PpError,
        diagnostics: Vec<Diagnostic>,
        source_lines: impl Into<Arc<Vec<String>>>,
    ) -> Self {
        Self {
            error,
            output: None,
            diagnostics,
            source_lines: source_lines.into(),
        }
    }

    pub fn with_output(mut self, output: String) -> Self {
        self.output = Some(output);
        self
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}

impl fmt::Display for PpRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for PpRunError {}

/// Build context lines for error display.
pub fn build_context_lines(
    line_num: u32,
    column: Option<usize>,
    col_end: Option<usize>,
    lines: Option<&[String]>,
    use_color: bool,
) -> Vec<String> {
    let line_idx = line_num.saturating_sub(1) as usize;
    match lines.and_then(|lines| lines.get(line_idx)) {
        Some(line) => {
            let line = line.trim_end_matches(['\r', '\n']);
            let display = highlight_span(line, column, col_end, use_color);
            vec![format!("{:>5} | {}", line_num, display)]
        }
        None => vec![format!("{:>5} | <source unavailable>", line_num)],
    }
}

fn default_diagnostic_code(kind: PpErrorKind) -> &'static str {
    match kind {
        PpErrorKind::Cli => "bfp101",
        PpErrorKind::Io => "bfp102",
        PpErrorKind::Literal => "bfp201",
        PpErrorKind::Unterminated => "bfp202",
        PpErrorKind::IgnoredDirective => "bfp203",
        PpErrorKind::UnknownDirective => "bfp301",
        PpErrorKind::Signature => "bfp302",
        PpErrorKind::InvalidArgument => "bfp303",
    }
}

/// Format an error message with an optional parameter.
pub fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(p) => format!("{msg}: {p}"),
        None => msg.to_string(),
    }
}

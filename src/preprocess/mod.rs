// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Line rewriter: scans each source line for its first directive, expands it
//! through the registry and splices the generated instructions in place of
//! the directive span.

pub mod cli;

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use tracing::{debug, info, trace};

use crate::core::directive::{scan_line, Scan};
use crate::core::error::{Diagnostic, PpError, PpErrorKind, PpRunError, PpRunReport, Severity};
use crate::core::generators::GenError;
use crate::core::registry::Registry;
use crate::core::text_utils::{column_of, split_terminator};
use crate::registry_defaults::build_default_registry;

use cli::{CliConfig, InputSource, OutputTarget};

/// One rewritten line and whatever was reported while rewriting it.
#[derive(Debug)]
pub struct LineExpansion {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Preprocessor {
    registry: Registry,
    file: Option<String>,
    strict: bool,
}

impl Preprocessor {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            file: None,
            strict: false,
        }
    }

    /// File name attached to diagnostics.
    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    /// Treat warnings as errors.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Rewrite one line (terminator included). On any error the line comes
    /// back unchanged and the error is in `diagnostics`.
    pub fn expand_line(&self, line: &str, line_num: u32) -> LineExpansion {
        let (body, terminator) = split_terminator(line);
        let mut diagnostics = Vec::new();
        let scan = match scan_line(body) {
            Ok(scan) => scan,
            Err(err) => {
                diagnostics.push(
                    self.diagnostic(line_num, Severity::Error, PpErrorKind::Literal, &err.message)
                        .with_column(Some(column_of(body, err.offset))),
                );
                return LineExpansion {
                    text: line.to_string(),
                    diagnostics,
                };
            }
        };

        let (directive, ignored) = match scan {
            Scan::Plain => {
                trace!(line = line_num, "no directive");
                return LineExpansion {
                    text: line.to_string(),
                    diagnostics,
                };
            }
            Scan::Unterminated { open } => {
                diagnostics.push(
                    self.diagnostic(
                        line_num,
                        Severity::Warning,
                        PpErrorKind::Unterminated,
                        "Unterminated directive; line copied unchanged",
                    )
                    .with_column(Some(column_of(body, open))),
                );
                return LineExpansion {
                    text: line.to_string(),
                    diagnostics,
                };
            }
            Scan::Found { directive, ignored } => (directive, ignored),
        };

        if let Some(offset) = ignored {
            diagnostics.push(
                self.diagnostic(
                    line_num,
                    Severity::Warning,
                    PpErrorKind::IgnoredDirective,
                    "Only the first directive on a line is expanded",
                )
                .with_column(Some(column_of(body, offset))),
            );
        }

        let column = Some(column_of(body, directive.span.start));
        let col_end = Some(column_of(body, directive.span.end) - 1);
        match self.registry.dispatch(&directive) {
            Ok(code) => {
                debug!(line = line_num, name = %directive.name, "directive replaced");
                let mut text = String::with_capacity(line.len() + code.len());
                text.push_str(&body[..directive.span.start]);
                text.push_str(&code);
                text.push_str(&body[directive.span.end..]);
                text.push_str(terminator);
                LineExpansion { text, diagnostics }
            }
            Err(err) => {
                debug!(line = line_num, name = %directive.name, error = %err, "directive not expanded");
                let mut diag = Diagnostic::new(line_num, Severity::Error, PpError::from(&err))
                    .with_file(self.file.clone())
                    .with_column(column)
                    .with_col_end(col_end);
                if let GenError::UnknownDirective { name } = &err {
                    if let Some(candidate) = self.registry.suggest(name) {
                        diag = diag.with_help(format!("did you mean `{candidate}`?"));
                    }
                }
                diagnostics.push(diag);
                LineExpansion {
                    text: line.to_string(),
                    diagnostics,
                }
            }
        }
    }

    /// Rewrite every line. Fails when any error was reported (or any warning
    /// in strict mode); the failure still carries the rewritten text.
    pub fn run(&self, source_lines: Vec<String>) -> Result<PpRunReport, PpRunError> {
        let mut output = String::new();
        let mut diagnostics = Vec::new();
        for (idx, line) in source_lines.iter().enumerate() {
            let expansion = self.expand_line(line, idx as u32 + 1);
            output.push_str(&expansion.text);
            diagnostics.extend(expansion.diagnostics);
        }

        let errors = diagnostics
            .iter()
            .filter(|diag| diag.severity() == Severity::Error)
            .count();
        let warnings = diagnostics.len() - errors;
        info!(lines = source_lines.len(), errors, warnings, "preprocessing finished");

        let failed = errors > 0 || (self.strict && warnings > 0);
        if failed {
            let summary = if errors > 0 {
                format!("{errors} directive error(s)")
            } else {
                format!("{warnings} warning(s) treated as errors")
            };
            let error = PpError::new(PpErrorKind::Cli, "Preprocessing failed", Some(&summary));
            return Err(PpRunError::new(error, diagnostics, source_lines).with_output(output));
        }
        Ok(PpRunReport::new(output, diagnostics, source_lines))
    }

    fn diagnostic(
        &self,
        line_num: u32,
        severity: Severity,
        kind: PpErrorKind,
        message: &str,
    ) -> Diagnostic {
        Diagnostic::new(line_num, severity, PpError::new(kind, message, None))
            .with_file(self.file.clone())
    }
}

/// Split text into lines, each keeping its terminator.
pub fn split_source_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

fn io_error(message: &str, param: &str) -> PpRunError {
    PpRunError::new(
        PpError::new(PpErrorKind::Io, message, Some(param)),
        Vec::new(),
        Vec::new(),
    )
}

fn read_input(input: &InputSource) -> Result<String, PpRunError> {
    match input {
        InputSource::Stdin => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| io_error("Cannot read standard input", &err.to_string()))?;
            Ok(text)
        }
        InputSource::File(path) => fs::read_to_string(path).map_err(|err| {
            io_error(
                "Cannot read input file",
                &format!("{}: {err}", path.display()),
            )
        }),
    }
}

/// Write generated text to the configured destination.
pub fn write_output(target: &OutputTarget, text: &str) -> io::Result<()> {
    match target {
        OutputTarget::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()
        }
        OutputTarget::File(path) => write_file(path, text),
    }
}

fn write_file(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)
}

/// Read the configured input, preprocess it, and write the result. Output is
/// withheld on failure unless `keep_going` is set.
pub fn run_with_config(config: &CliConfig) -> Result<PpRunReport, PpRunError> {
    let text = read_input(&config.input)?;
    let preprocessor = Preprocessor::new(build_default_registry(config.limits))
        .with_file(config.input.display_name())
        .with_strict(config.strict);
    let result = preprocessor.run(split_source_lines(&text));
    let output = match &result {
        Ok(report) => Some(report.output()),
        Err(err) if config.keep_going => err.output(),
        Err(_) => None,
    };
    if let Some(output) = output {
        write_output(&config.output, output).map_err(|err| {
            io_error(
                "Cannot write output",
                &format!("{}: {err}", config.output.display_name()),
            )
        })?;
    }
    result
}

// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for bfpp.

use std::fs::OpenOptions;
use std::io::{self, Write};

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use bfpp::core::error::{Diagnostic, Severity};
use bfpp::core::registry::{Limits, Registry};
use bfpp::core::value::format_kinds;
use bfpp::preprocess::cli::{validate_cli, Cli, DiagnosticsSinkConfig, OutputFormat};
use bfpp::preprocess::run_with_config;
use bfpp::registry_defaults::build_default_registry;

struct DiagnosticsSink {
    writer: Option<Box<dyn Write>>,
}

impl DiagnosticsSink {
    fn from_config(config: &DiagnosticsSinkConfig) -> io::Result<Self> {
        match config {
            DiagnosticsSinkConfig::Disabled => Ok(Self { writer: None }),
            DiagnosticsSinkConfig::Stderr => Ok(Self {
                writer: Some(Box::new(io::stderr())),
            }),
            DiagnosticsSinkConfig::File { path, append } => {
                let mut opts = OpenOptions::new();
                opts.create(true).write(true);
                if *append {
                    opts.append(true);
                } else {
                    opts.truncate(true);
                }
                let file = opts.open(path)?;
                Ok(Self {
                    writer: Some(Box::new(file)),
                })
            }
        }
    }

    fn emit_line(&mut self, line: &str) {
        if let Some(writer) = &mut self.writer {
            let _ = writeln!(writer, "{line}");
        }
    }

    fn emit_diagnostics(
        &mut self,
        diagnostics: &[Diagnostic],
        source_lines: &[String],
        use_color: bool,
        format: OutputFormat,
    ) {
        for diag in diagnostics {
            self.emit_line(&format_diagnostic_line(
                diag,
                Some(source_lines),
                use_color,
                format,
            ));
        }
    }
}

fn format_diagnostic_line(
    diag: &Diagnostic,
    source_lines: Option<&[String]>,
    use_color: bool,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => json!({
            "code": diag.code(),
            "severity": diag.severity().as_str(),
            "message": diag.message(),
            "file": diag.file(),
            "line": diag.line(),
            "col_start": diag.column(),
            "col_end": diag.col_end(),
            "help": diag.help(),
        })
        .to_string(),
        OutputFormat::Text => diag.format_with_context(source_lines, use_color),
    }
}

fn directive_listing(registry: &Registry, format: OutputFormat) -> String {
    let entries = registry.names().into_iter().filter_map(|name| {
        registry
            .lookup(name)
            .ok()
            .map(|generator| (name, generator.signature()))
    });
    match format {
        OutputFormat::Json => {
            let items: Vec<serde_json::Value> = entries
                .map(|(name, signature)| {
                    json!({
                        "name": name,
                        "args": signature.iter().map(|kind| kind.name()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            serde_json::Value::Array(items).to_string()
        }
        OutputFormat::Text => entries
            .map(|(name, signature)| format!("{name:<12} {}", format_kinds(signature)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn keep_diagnostic(diag: &Diagnostic, emit_warnings: bool) -> bool {
    emit_warnings || diag.severity() != Severity::Warning
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.list_directives {
        let registry = build_default_registry(Limits::default());
        println!("{}", directive_listing(&registry, cli.format));
        return;
    }

    let cli_config = match validate_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let mut sink = match DiagnosticsSink::from_config(&cli_config.diagnostics_sink) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("Failed to open diagnostics sink: {err}");
            std::process::exit(1);
        }
    };

    let use_color = std::env::var("NO_COLOR").is_err()
        && matches!(cli_config.diagnostics_sink, DiagnosticsSinkConfig::Stderr);
    match run_with_config(&cli_config) {
        Ok(report) => {
            if cli_config.quiet {
                return;
            }
            let diagnostics: Vec<Diagnostic> = report
                .diagnostics()
                .iter()
                .filter(|diag| keep_diagnostic(diag, cli_config.emit_warnings))
                .cloned()
                .collect();
            sink.emit_diagnostics(
                &diagnostics,
                report.source_lines(),
                use_color,
                cli_config.output_format,
            );
        }
        Err(err) => {
            let diagnostics: Vec<Diagnostic> = err
                .diagnostics()
                .iter()
                .filter(|diag| keep_diagnostic(diag, cli_config.emit_warnings))
                .cloned()
                .collect();
            sink.emit_diagnostics(
                &diagnostics,
                err.source_lines(),
                use_color,
                cli_config.output_format,
            );
            if cli_config.output_format != OutputFormat::Json
                && !matches!(cli_config.diagnostics_sink, DiagnosticsSinkConfig::Disabled)
            {
                sink.emit_line(&err.to_string());
            }
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfpp::core::error::{PpError, PpErrorKind};

    #[test]
    fn format_diagnostic_line_json_has_expected_keys_with_nulls() {
        let diag = Diagnostic::new(
            7,
            Severity::Error,
            PpError::new(PpErrorKind::InvalidArgument, "boom", None),
        );
        let line = format_diagnostic_line(&diag, None, false, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(value["code"], "bfp303");
        assert_eq!(value["severity"], "error");
        assert_eq!(value["message"], "boom");
        assert_eq!(value["line"], 7);
        assert!(value["file"].is_null());
        assert!(value["col_start"].is_null());
        assert!(value["col_end"].is_null());
        assert!(value["help"].is_array());
    }

    #[test]
    fn text_listing_shows_signatures() {
        let registry = build_default_registry(Limits::default());
        let listing = directive_listing(&registry, OutputFormat::Text);
        assert!(listing.lines().any(|line| line == "ifelse       (text, text, int)"));
        assert!(listing.lines().any(|line| line == "make_arr     (list[int])"));
        assert_eq!(listing.lines().count(), 15);
    }

    #[test]
    fn json_listing_is_an_array_of_entries() {
        let registry = build_default_registry(Limits::default());
        let value: serde_json::Value =
            serde_json::from_str(&directive_listing(&registry, OutputFormat::Json))
                .expect("valid json");
        let entries = value.as_array().expect("array");
        assert_eq!(entries.len(), 15);
        assert_eq!(entries[0]["name"], "+");
        assert_eq!(entries[0]["args"][0], "int");
    }

    #[test]
    fn warnings_are_filtered_when_disabled() {
        let warning = Diagnostic::new(
            1,
            Severity::Warning,
            PpError::new(PpErrorKind::Unterminated, "unterminated", None),
        );
        assert!(keep_diagnostic(&warning, true));
        assert!(!keep_diagnostic(&warning, false));
    }
}

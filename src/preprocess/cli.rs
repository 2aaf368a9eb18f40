// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::env;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::core::error::{PpError, PpErrorKind, PpRunError};
use crate::core::registry::{Limits, DEFAULT_CELL_BITS, DEFAULT_MAX_RUN};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Expand bracketed directives in brainfuck source into plain instructions.

Each line may contain one directive such as (+ 5), (mv 2) or (print \"hi\").
The first directive on a line is replaced by the instructions it generates;
everything else on the line is copied unchanged.
Output goes to stdout unless -o/--out names a file.
A line whose directive fails is reported and, with --keep-going, copied verbatim.";

#[derive(Parser, Debug)]
#[command(
    name = "bfpp",
    version = VERSION,
    about = "Brainfuck directive preprocessor",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        value_name = "FILE",
        required_unless_present = "list_directives",
        long_help = "Source file to preprocess. Use - to read standard input."
    )]
    pub input: Option<PathBuf>,
    #[arg(
        short = 'o',
        long = "out",
        value_name = "FILE",
        long_help = "Write the generated brainfuck to FILE instead of stdout."
    )]
    pub out: Option<PathBuf>,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Diagnostics format. text is default; json prints one object per diagnostic."
    )]
    pub format: OutputFormat,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress diagnostics for successful runs. Errors are still reported unless --no-error is set."
    )]
    pub quiet: bool,
    #[arg(
        short = 'E',
        long = "error",
        value_name = "FILE",
        long_help = "Write diagnostics to FILE instead of stderr."
    )]
    pub error_file: Option<PathBuf>,
    #[arg(
        long = "error-append",
        action = ArgAction::SetTrue,
        requires = "error_file",
        long_help = "Append diagnostics to --error FILE instead of truncating it."
    )]
    pub error_append: bool,
    #[arg(
        long = "no-error",
        action = ArgAction::SetTrue,
        conflicts_with_all = ["error_file", "error_append"],
        long_help = "Disable all diagnostic output routing."
    )]
    pub no_error: bool,
    #[arg(
        short = 'w',
        long = "no-warn",
        action = ArgAction::SetTrue,
        conflicts_with = "strict",
        long_help = "Suppress warning diagnostics."
    )]
    pub no_warn: bool,
    #[arg(
        long = "strict",
        action = ArgAction::SetTrue,
        long_help = "Treat warnings (unterminated or ignored directives) as errors."
    )]
    pub strict: bool,
    #[arg(
        short = 'k',
        long = "keep-going",
        action = ArgAction::SetTrue,
        long_help = "Write output even when some directives failed; failing directives stay verbatim."
    )]
    pub keep_going: bool,
    #[arg(
        long = "cell-bits",
        value_name = "BITS",
        long_help = "Tape cell width in bits (8, 16 or 32). print rejects characters that do not fit. Defaults to 8."
    )]
    pub cell_bits: Option<u32>,
    #[arg(
        long = "max-run",
        value_name = "N",
        long_help = "Largest integer argument accepted by any directive. Defaults to 65536."
    )]
    pub max_run: Option<u64>,
    #[arg(
        long = "list-directives",
        action = ArgAction::SetTrue,
        long_help = "Print every directive name with its argument signature and exit."
    )]
    pub list_directives: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Name attached to diagnostics; stdin has none.
    pub fn display_name(&self) -> Option<String> {
        match self {
            InputSource::Stdin => None,
            InputSource::File(path) => Some(path.to_string_lossy().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn display_name(&self) -> String {
        match self {
            OutputTarget::Stdout => "<stdout>".to_string(),
            OutputTarget::File(path) => path.to_string_lossy().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticsSinkConfig {
    Stderr,
    File { path: PathBuf, append: bool },
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn cli_error(message: impl Into<String>) -> PpRunError {
    PpRunError::new(
        PpError::new(PpErrorKind::Cli, &message.into(), None),
        Vec::new(),
        Vec::new(),
    )
}

fn parse_env_bool(var_name: &str) -> Result<Option<bool>, PpRunError> {
    let Some(raw) = env::var_os(var_name) else {
        return Ok(None);
    };
    let value = raw.to_string_lossy().trim().to_ascii_lowercase();
    let parsed = match value.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        "" => None,
        _ => {
            return Err(cli_error(format!(
                "Invalid boolean value for {var_name}: {value}"
            )))
        }
    };
    Ok(parsed)
}

fn parse_env_path(var_name: &str) -> Result<Option<PathBuf>, PpRunError> {
    let Some(raw) = env::var_os(var_name) else {
        return Ok(None);
    };
    let value = raw.to_string_lossy().trim().to_string();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(value)))
}

fn parse_env_u64(var_name: &str) -> Result<Option<u64>, PpRunError> {
    let Some(raw) = env::var_os(var_name) else {
        return Ok(None);
    };
    let value = raw.to_string_lossy().trim().to_string();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|_| cli_error(format!("Invalid integer value for {var_name}: {value}")))
}

/// Validate CLI arguments and return parsed configuration.
pub fn validate_cli(cli: &Cli) -> Result<CliConfig, PpRunError> {
    let env_out = parse_env_path("BFPP_OUT")?;
    let env_error_file = parse_env_path("BFPP_ERROR_FILE")?;
    let env_error_append = parse_env_bool("BFPP_ERROR_APPEND")?;
    let env_no_error = parse_env_bool("BFPP_NO_ERROR")?;
    let env_quiet = parse_env_bool("BFPP_QUIET")?;
    let env_no_warn = parse_env_bool("BFPP_NO_WARN")?;
    let env_strict = parse_env_bool("BFPP_STRICT")?;
    let env_keep_going = parse_env_bool("BFPP_KEEP_GOING")?;
    let env_cell_bits = parse_env_u64("BFPP_CELL_BITS")?;
    let env_max_run = parse_env_u64("BFPP_MAX_RUN")?;

    let input = match cli.input.as_deref() {
        Some(path) if path.as_os_str() == "-" => InputSource::Stdin,
        Some(path) => InputSource::File(path.to_path_buf()),
        None => return Err(cli_error("An input file is required")),
    };

    let output = match cli.out.clone().or(env_out) {
        Some(path) if path.as_os_str() == "-" => OutputTarget::Stdout,
        Some(path) => OutputTarget::File(path),
        None => OutputTarget::Stdout,
    };
    if let (InputSource::File(src), OutputTarget::File(dst)) = (&input, &output) {
        if src == dst {
            return Err(cli_error(format!(
                "Output file would overwrite the input: {}",
                dst.display()
            )));
        }
    }

    let no_error = cli.no_error || env_no_error.unwrap_or(false);
    let diagnostics_sink = if no_error {
        DiagnosticsSinkConfig::Disabled
    } else if let Some(path) = cli.error_file.clone().or(env_error_file) {
        DiagnosticsSinkConfig::File {
            path,
            append: cli.error_append || env_error_append.unwrap_or(false),
        }
    } else {
        if cli.error_append || env_error_append == Some(true) {
            return Err(cli_error("--error-append requires --error FILE"));
        }
        DiagnosticsSinkConfig::Stderr
    };

    let strict = cli.strict || env_strict.unwrap_or(false);
    let emit_warnings = !(cli.no_warn || env_no_warn.unwrap_or(false));
    if strict && !emit_warnings {
        return Err(cli_error("--strict cannot be combined with --no-warn"));
    }

    let cell_bits = match cli.cell_bits.map(u64::from).or(env_cell_bits) {
        None => DEFAULT_CELL_BITS,
        Some(bits @ (8 | 16 | 32)) => bits as u32,
        Some(bits) => {
            return Err(cli_error(format!(
                "Unsupported cell width: {bits} (expected 8, 16 or 32)"
            )))
        }
    };
    let max_run = cli.max_run.or(env_max_run).unwrap_or(DEFAULT_MAX_RUN);
    if max_run == 0 {
        return Err(cli_error("--max-run must be greater than zero"));
    }

    Ok(CliConfig {
        input,
        output,
        output_format: cli.format,
        diagnostics_sink,
        quiet: cli.quiet || env_quiet.unwrap_or(false),
        emit_warnings,
        strict,
        keep_going: cli.keep_going || env_keep_going.unwrap_or(false),
        limits: Limits { max_run, cell_bits },
    })
}

/// Validated CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub input: InputSource,
    pub output: OutputTarget,
    pub output_format: OutputFormat,
    pub diagnostics_sink: DiagnosticsSinkConfig,
    pub quiet: bool,
    pub emit_warnings: bool,
    pub strict: bool,
    pub keep_going: bool,
    pub limits: Limits,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::{Mutex, OnceLock};

    const ENV_VARS: [&str; 10] = [
        "BFPP_OUT",
        "BFPP_ERROR_FILE",
        "BFPP_ERROR_APPEND",
        "BFPP_NO_ERROR",
        "BFPP_QUIET",
        "BFPP_NO_WARN",
        "BFPP_STRICT",
        "BFPP_KEEP_GOING",
        "BFPP_CELL_BITS",
        "BFPP_MAX_RUN",
    ];

    /// Run `test` with exactly `vars` set among the BFPP_* variables.
    fn with_env_vars(vars: &[(&str, &str)], test: impl FnOnce()) {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        let _guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let saved: Vec<(&str, Option<OsString>)> = ENV_VARS
            .iter()
            .map(|key| (*key, env::var_os(key)))
            .collect();

        for key in ENV_VARS {
            // SAFETY: tests serialize env access via ENV_LOCK.
            unsafe { env::remove_var(key) }
        }
        for (key, value) in vars {
            // SAFETY: tests serialize env access via ENV_LOCK.
            unsafe { env::set_var(key, value) }
        }

        test();

        for (key, value) in saved {
            match value {
                // SAFETY: tests serialize env access via ENV_LOCK.
                Some(value) => unsafe { env::set_var(key, value) },
                // SAFETY: tests serialize env access via ENV_LOCK.
                None => unsafe { env::remove_var(key) },
            }
        }
    }

    #[test]
    fn cli_parses_input_and_output() {
        let cli = Cli::parse_from(["bfpp", "prog.bfpp", "-o", "prog.bf", "--format", "json"]);
        assert_eq!(cli.input, Some(PathBuf::from("prog.bfpp")));
        assert_eq!(cli.out, Some(PathBuf::from("prog.bf")));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn cli_requires_input_unless_listing() {
        assert!(Cli::try_parse_from(["bfpp"]).is_err());
        let cli = Cli::try_parse_from(["bfpp", "--list-directives"]).expect("listing alone");
        assert!(cli.list_directives);
    }

    #[test]
    fn validate_cli_defaults() {
        with_env_vars(&[], || {
            let cli = Cli::parse_from(["bfpp", "prog.bfpp"]);
            let config = validate_cli(&cli).expect("valid");
            assert_eq!(config.input, InputSource::File(PathBuf::from("prog.bfpp")));
            assert_eq!(config.output, OutputTarget::Stdout);
            assert_eq!(config.diagnostics_sink, DiagnosticsSinkConfig::Stderr);
            assert_eq!(config.limits, Limits::default());
            assert!(config.emit_warnings);
            assert!(!config.strict);
            assert!(!config.keep_going);
        });
    }

    #[test]
    fn validate_cli_dash_means_standard_streams() {
        with_env_vars(&[], || {
            let cli = Cli::parse_from(["bfpp", "-", "-o", "-"]);
            let config = validate_cli(&cli).expect("valid");
            assert_eq!(config.input, InputSource::Stdin);
            assert_eq!(config.output, OutputTarget::Stdout);
            assert_eq!(config.input.display_name(), None);
        });
    }

    #[test]
    fn validate_cli_rejects_overwriting_input() {
        with_env_vars(&[], || {
            let cli = Cli::parse_from(["bfpp", "a.bfpp", "-o", "a.bfpp"]);
            let err = validate_cli(&cli).expect_err("same path");
            assert!(err.to_string().contains("overwrite the input"));
        });
    }

    #[test]
    fn validate_cli_sets_diagnostics_sink() {
        with_env_vars(&[], || {
            let cli = Cli::parse_from(["bfpp", "a.bfpp", "-E", "diag.txt", "--error-append"]);
            let config = validate_cli(&cli).expect("valid");
            assert_eq!(
                config.diagnostics_sink,
                DiagnosticsSinkConfig::File {
                    path: PathBuf::from("diag.txt"),
                    append: true
                }
            );
            let cli = Cli::parse_from(["bfpp", "a.bfpp", "--no-error"]);
            let config = validate_cli(&cli).expect("valid");
            assert_eq!(config.diagnostics_sink, DiagnosticsSinkConfig::Disabled);
        });
    }

    #[test]
    fn validate_cli_checks_limits() {
        with_env_vars(&[], || {
            let cli = Cli::parse_from(["bfpp", "a.bfpp", "--cell-bits", "16", "--max-run", "300"]);
            let config = validate_cli(&cli).expect("valid");
            assert_eq!(
                config.limits,
                Limits {
                    max_run: 300,
                    cell_bits: 16
                }
            );
            let cli = Cli::parse_from(["bfpp", "a.bfpp", "--cell-bits", "12"]);
            assert!(validate_cli(&cli).is_err());
            let cli = Cli::parse_from(["bfpp", "a.bfpp", "--max-run", "0"]);
            assert!(validate_cli(&cli).is_err());
        });
    }

    #[test]
    fn validate_cli_applies_env_defaults_when_cli_not_set() {
        with_env_vars(
            &[
                ("BFPP_OUT", "env.bf"),
                ("BFPP_QUIET", "yes"),
                ("BFPP_KEEP_GOING", "1"),
                ("BFPP_CELL_BITS", "32"),
            ],
            || {
                let cli = Cli::parse_from(["bfpp", "a.bfpp"]);
                let config = validate_cli(&cli).expect("valid");
                assert_eq!(config.output, OutputTarget::File(PathBuf::from("env.bf")));
                assert!(config.quiet);
                assert!(config.keep_going);
                assert_eq!(config.limits.cell_bits, 32);
            },
        );
    }

    #[test]
    fn validate_cli_cli_values_override_env_values() {
        with_env_vars(&[("BFPP_OUT", "env.bf"), ("BFPP_MAX_RUN", "5")], || {
            let cli = Cli::parse_from(["bfpp", "a.bfpp", "-o", "cli.bf", "--max-run", "9"]);
            let config = validate_cli(&cli).expect("valid");
            assert_eq!(config.output, OutputTarget::File(PathBuf::from("cli.bf")));
            assert_eq!(config.limits.max_run, 9);
        });
    }

    #[test]
    fn validate_cli_rejects_invalid_env_values() {
        with_env_vars(&[("BFPP_STRICT", "maybe")], || {
            let cli = Cli::parse_from(["bfpp", "a.bfpp"]);
            let err = validate_cli(&cli).expect_err("bad boolean");
            assert!(err.to_string().contains("BFPP_STRICT"));
        });
        with_env_vars(&[("BFPP_MAX_RUN", "lots")], || {
            let cli = Cli::parse_from(["bfpp", "a.bfpp"]);
            assert!(validate_cli(&cli).is_err());
        });
    }

    #[test]
    fn validate_cli_rejects_strict_without_warnings() {
        with_env_vars(&[("BFPP_NO_WARN", "1")], || {
            let cli = Cli::parse_from(["bfpp", "a.bfpp", "--strict"]);
            assert!(validate_cli(&cli).is_err());
        });
    }
}

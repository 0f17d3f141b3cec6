//! CLI argument definitions for the `icd` validator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "icd",
    version,
    about = "Validate tabular data against an interface control document",
    long_about = "Validate delimited and fixed width data files against an interface \
                  control document (ICD).\n\n\
                  The ICD declares the data format, one field per column and checks \
                  across rows. Every rejected row is reported with its location and reason."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include cell contents in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate data files against an ICD.
    Validate(ValidateArgs),

    /// Show the data format, fields and checks declared by an ICD.
    Describe(DescribeArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Path to the ICD (delimited text).
    #[arg(value_name = "ICD")]
    pub icd: PathBuf,

    /// Data files to validate.
    #[arg(value_name = "DATA", required = true)]
    pub data: Vec<PathBuf>,

    /// Write a JSON report of all rejected rows and failed checks.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Maximum number of rejected rows listed per file (0 lists none).
    #[arg(long = "max-rejected", value_name = "N", default_value_t = 20)]
    pub max_rejected: usize,

    /// Hide the progress spinner.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Parser)]
pub struct DescribeArgs {
    /// Path to the ICD (delimited text).
    #[arg(value_name = "ICD")]
    pub icd: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

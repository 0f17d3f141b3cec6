//! `icd` command line validator.

use clap::{ColorChoice, Parser};
use icd_cli::commands::{ValidateOptions, describe, run_validate};
use icd_cli::logging::{LogConfig, LogFormat, init_logging};
use icd_cli::summary::{print_description, print_summary};
use std::io::{self, IsTerminal};
use tracing::error;
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Validate(args) => {
            let options = ValidateOptions {
                report: args.report,
                show_progress: !args.no_progress && io::stderr().is_terminal(),
            };
            match run_validate(&args.icd, &args.data, &options) {
                Ok(run) => {
                    print_summary(&run, args.max_rejected);
                    i32::from(run.has_failures())
                }
                Err(error) => {
                    error!(error = %format!("{error:#}"), "validation aborted");
                    eprintln!("error: {error:#}");
                    1
                }
            }
        }
        Command::Describe(args) => match describe(&args.icd) {
            Ok(icd) => {
                print_description(&icd);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig::default();
    if let Some(level) = cli.log_level {
        config = config.with_level_filter(match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        });
    } else if cli.verbosity.is_present() {
        config = config.with_level_filter(cli.verbosity.tracing_level_filter());
    } else {
        config.level_filter = cli.verbosity.tracing_level_filter();
    }
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
        .with_format(match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        })
        .with_log_file(cli.log_file.clone())
        .with_ansi(with_ansi)
        .with_log_data(cli.log_data)
}

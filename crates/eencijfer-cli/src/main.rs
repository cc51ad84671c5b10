//! eencijfer ETL command line.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use eencijfer_cli::config::default_config_path;
use eencijfer_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_convert, run_create_assets, run_init, run_qa};
use crate::summary::{print_assets_summary, print_convert_summary, print_init, print_qa};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    let config_path = config_path(cli)?;
    let code = match &cli.command {
        Command::Init(args) => {
            print_init(&run_init(&config_path, args)?);
            0
        }
        Command::Convert(args) => {
            let result = run_convert(&config_path, args)?;
            print_convert_summary(&result);
            i32::from(result.has_errors)
        }
        Command::CreateAssets(args) => {
            let result = run_create_assets(&config_path, args)?;
            print_assets_summary(&result);
            i32::from(result.has_errors)
        }
        Command::Qa => {
            print_qa(&run_qa(&config_path)?);
            0
        }
    };
    Ok(code)
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    cli.config
        .clone()
        .or_else(default_config_path)
        .context("cannot determine the configuration directory, pass --config")
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        log_data: cli.log_data,
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

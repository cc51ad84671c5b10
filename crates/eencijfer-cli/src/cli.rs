//! CLI argument definitions for the eencijfer ETL.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use eencijfer_model::ExportFormat;

#[derive(Parser)]
#[command(
    name = "eencijfer",
    version,
    about = "ETL tool for the Dutch eencijfer student register",
    long_about = "Decode fixed-width eencijfer deliveries, remove personal data and\n\
                  build enriched student, cohort and exam-grade tables."
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

    /// Allow identifiers and other row values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Configuration file (default: the platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a default configuration file.
    Init(InitArgs),

    /// Decode raw files to the result directory and remove personal data.
    Convert(ConvertArgs),

    /// Build the eencijfer, cohorten and eindexamencijfers assets.
    CreateAssets(AssetsArgs),

    /// Show which definition each raw file resolves to.
    Qa,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Table format (overrides the configuration).
    #[arg(long = "export-format", value_enum)]
    pub export_format: Option<ExportFormatArg>,

    /// Decode fields with the converter named in the definition.
    #[arg(
        long = "use-column-converters",
        short = 'c',
        conflicts_with = "no_column_converters"
    )]
    pub use_column_converters: bool,

    /// Decode every field as text.
    #[arg(long = "no-column-converters", short = 'C')]
    pub no_column_converters: bool,

    /// Replace person numbers with pseudo-ids and empty PII columns.
    #[arg(long = "remove-pii", short = 'p', conflicts_with = "keep_pii")]
    pub remove_pii: bool,

    /// Keep person numbers and PII columns.
    #[arg(long = "keep-pii", short = 'P')]
    pub keep_pii: bool,

    /// Attach local ids from the configured table.
    #[arg(long = "add-local-id", short = 's', conflicts_with = "no_local_id")]
    pub add_local_id: bool,

    /// Do not attach local ids.
    #[arg(long = "no-local-id", short = 'S')]
    pub no_local_id: bool,
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl ConvertArgs {
    pub fn column_converters(&self) -> Option<bool> {
        flag_pair(self.use_column_converters, self.no_column_converters)
    }

    pub fn remove_pii(&self) -> Option<bool> {
        flag_pair(self.remove_pii, self.keep_pii)
    }

    pub fn add_local_id(&self) -> Option<bool> {
        flag_pair(self.add_local_id, self.no_local_id)
    }
}

#[derive(Args)]
pub struct AssetsArgs {
    /// Table format (overrides the configuration).
    #[arg(long = "export-format", value_enum)]
    pub export_format: Option<ExportFormatArg>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormatArg {
    Parquet,
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Parquet => ExportFormat::Parquet,
            ExportFormatArg::Csv => ExportFormat::Csv,
        }
    }
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

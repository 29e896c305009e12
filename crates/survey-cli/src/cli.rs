//! CLI argument definitions for the observation table tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "survey-obs",
    version,
    about = "Validate and commit wildlife observation tables",
    long_about = "Validate wildlife observation rows against core, sampling, date and \
                  per-taxon measurement rules.\n\n\
                  Rows are read from CSV; measurement definitions come from a JSON \
                  taxonomy catalogue."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Stage the rows of a CSV file and save them as one batch.
    Validate(ValidateArgs),

    /// Search the measurement and environment columns of a taxonomy.
    Columns(ColumnsArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Observation rows, one per CSV record.
    #[arg(value_name = "ROWS.csv")]
    pub rows: PathBuf,

    /// Taxonomy catalogue (JSON) with measurement and environment definitions.
    #[arg(long = "taxonomy", value_name = "FILE")]
    pub taxonomy: PathBuf,

    /// Additional measurement/environment columns to activate.
    ///
    /// CSV headers matching a catalogue column are activated automatically.
    #[arg(long = "columns", value_name = "IDS", value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Survey whose column settings are used.
    #[arg(long = "survey", value_name = "ID", default_value_t = 1)]
    pub survey: u64,

    /// Directory for persisted column settings (kept in memory when unset).
    #[arg(long = "state-dir", value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Table configuration (TOML).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write committed rows to this JSON file.
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ColumnsArgs {
    /// Search term, matched against column labels.
    #[arg(value_name = "TERM")]
    pub term: String,

    /// Taxonomy catalogue (JSON).
    #[arg(long = "taxonomy", value_name = "FILE")]
    pub taxonomy: PathBuf,

    /// Which column family to search.
    #[arg(long = "kind", value_enum, default_value = "all")]
    pub kind: ColumnKindArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColumnKindArg {
    Measurement,
    Environment,
    All,
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

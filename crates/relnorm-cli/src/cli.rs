//! CLI argument definitions for the schema normalizer.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use relnorm_model::NormalForm;

#[derive(Parser)]
#[command(
    name = "relnorm",
    version,
    about = "Relational schema normalizer - decompose a relation into 1NF through 5NF",
    long_about = "Decompose a relation described by a schema sheet into a set of relations\n\
                  satisfying a target normal form.\n\n\
                  The sheet carries the attributes, a data sample, keys, functional and\n\
                  multivalued dependencies. Multivalued and join dependencies are also\n\
                  mined from the data sample."
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
    /// Normalize the relation in a schema sheet and write the report.
    Normalize(NormalizeArgs),

    /// Show which normal forms the relation in a schema sheet satisfies.
    Check(CheckArgs),

    /// List the supported normal forms.
    Levels,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Path to the schema sheet (CSV).
    #[arg(value_name = "SHEET")]
    pub sheet: PathBuf,

    /// Target normal form (default: the level named in the sheet).
    #[arg(long = "level", value_name = "LEVEL", value_parser = parse_level)]
    pub level: Option<NormalForm>,

    /// Write the report to this file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format.
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: ReportFormatArg,

    /// Skip foreign key inference.
    #[arg(long = "no-foreign-keys")]
    pub no_foreign_keys: bool,

    /// Keep duplicate and absorbed leftover relations between levels.
    #[arg(long = "keep-redundant")]
    pub keep_redundant: bool,

    /// Maximum decomposition passes per level before giving up.
    #[arg(long = "max-passes", value_name = "N", default_value_t = 64)]
    pub max_passes: usize,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the schema sheet (CSV).
    #[arg(value_name = "SHEET")]
    pub sheet: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Text,
    Json,
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

fn parse_level(value: &str) -> Result<NormalForm, String> {
    value.parse().map_err(|err: relnorm_model::ModelError| err.to_string())
}

//! CLI argument definitions for the contracts pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "contracts",
    version,
    about = "Contracts Finder pipeline - publish local authority procurement records",
    long_about = "Fetch the Contracts Finder OCDS workbook, split it into per-entity CSVs,\n\
                  resolve buyers to local authority codes, join the entity tables on the\n\
                  release link and publish one CSV of council contracts."
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

    /// Include timestamps in log lines.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the whole pipeline and publish the contracts CSV.
    ///
    /// Needs the local authority registry CSV (`[registry] path`, default
    /// `data/reference/local_authorities.csv`), which is not downloaded.
    Build(BuildArgs),

    /// List the configured column mappings.
    Mappings(MappingsArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Pipeline configuration (default: ./contracts.toml when present).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Reuse the per-sheet CSVs already in the raw directory instead of
    /// downloading and splitting the workbook.
    #[arg(long = "skip-fetch")]
    pub skip_fetch: bool,
}

#[derive(Parser)]
pub struct MappingsArgs {
    /// Pipeline configuration (default: ./contracts.toml when present).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
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

//! CLI argument definitions for the hospital ETL pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use hetl_model::Dataset;

#[derive(Parser)]
#[command(
    name = "hetl",
    version,
    about = "Hospital ETL - load hospital CSV extracts into the analytics warehouse",
    long_about = "Validate, normalize and load hospital CSV extracts.\n\n\
                  Runs the extract-validate-transform-load pipeline per dataset\n\
                  (patients, treatments, analysis) with idempotent warehouse writes\n\
                  and a rejects report for records that fail validation."
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
    /// Run the pipeline across the configured datasets.
    Run(RunArgs),

    /// List registered dataset schemas.
    Datasets,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory containing the per-dataset CSV sources.
    #[arg(long = "source-dir", value_name = "DIR", env = "HETL_SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Warehouse directory (default: <SOURCE_DIR>/warehouse).
    #[arg(long = "warehouse-dir", value_name = "DIR", env = "HETL_WAREHOUSE_DIR")]
    pub warehouse_dir: Option<PathBuf>,

    /// Rejects diagnostics file (default: <WAREHOUSE_DIR>/rejects.jsonl).
    #[arg(long = "rejects-file", value_name = "PATH", env = "HETL_REJECTS_FILE")]
    pub rejects_file: Option<PathBuf>,

    /// Run identifier for idempotency tagging (default: derived from the
    /// current UTC time).
    #[arg(long = "run-id", value_name = "ID", env = "HETL_RUN_ID")]
    pub run_id: Option<String>,

    /// Restrict the run to the named datasets (repeatable).
    #[arg(long = "dataset", value_name = "NAME")]
    pub datasets: Vec<Dataset>,
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

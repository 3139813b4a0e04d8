use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::logging::LogArgs;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Space-separated columns
    Table,
    /// Comma-separated columns
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "hiccups",
    version,
    about = "Measure OS scheduling jitter on every available CPU"
)]
pub struct Cli {
    /// Observation runtime in seconds (default: 5)
    #[arg(short = 'r', long = "runtime")]
    pub runtime: Option<u64>,

    /// Jitter threshold in nanoseconds (default: calibrated)
    #[arg(short = 't', long = "threshold")]
    pub threshold: Option<u64>,

    /// Per-CPU sample capacity to reserve (default: runtime * 65536)
    #[arg(short = 's', long = "samples")]
    pub samples: Option<usize>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// Configuration file path (default: /etc/hiccups.toml)
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,
}

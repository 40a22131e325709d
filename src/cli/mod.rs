use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use fcsframe::fcs::FcsReader;
use fcsframe::frame::Frame;
use fcsframe::persist;

mod config;
mod convert;
mod export;
mod info;
mod stats;
mod validate;

/// fcsframe - Flow cytometry files as analysable event frames
#[derive(Parser)]
#[command(name = "fcsframe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for statistic tables
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum TableFormat {
    /// Tab separated `label<TAB>value` lines
    #[default]
    Tsv,
    /// JSON array of `{label, value}` objects
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display header, keywords and parameters of an FCS file
    Info {
        /// Input FCS file or saved frame
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Also list every TEXT keyword
        #[arg(short, long)]
        keywords: bool,
    },

    /// Validate FCS file integrity
    Validate {
        /// Input FCS file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse FCS files and save them as frames
    Convert {
        /// Input FCS files or directories to scan
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the saved frames (defaults to each input's directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Apply the spillover matrix found in each file
        #[arg(short, long)]
        compensate: bool,

        /// Worker threads for parallel parsing
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Apply gates and compute statistics defined in a TOML file
    Stats {
        /// Input FCS file or saved frame
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// TOML file with [[gate]] and [[stat]] tables
        #[arg(long, value_name = "FILE")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "tsv", value_enum)]
        format: TableFormat,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Export events as CSV
    Export {
        /// Input FCS file or saved frame
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output CSV path (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write transformed display values instead of raw values
        #[arg(short, long)]
        display: bool,

        /// Apply the file's spillover matrix first
        #[arg(short, long)]
        compensate: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Info { file, keywords } => info::run(file, keywords),
        Commands::Validate { file, json } => validate::run(file, json),
        Commands::Convert {
            inputs,
            output_dir,
            compensate,
            threads,
            config,
        } => convert::run(inputs, output_dir, compensate, threads, config),
        Commands::Stats {
            file,
            config,
            format,
            output,
        } => stats::run(file, config, format, output),
        Commands::Export {
            file,
            output,
            display,
            compensate,
        } => export::run(file, output, display, compensate),
    }
}

/// Load an FCS file, or a frame saved by `convert`
pub(crate) fn load_frame(path: &Path) -> Result<Frame> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.starts_with(&persist::MAGIC) {
        persist::load(&bytes).with_context(|| format!("Failed to load frame {}", path.display()))
    } else {
        FcsReader::default()
            .parse(&bytes)
            .with_context(|| format!("Failed to parse FCS file {}", path.display()))
    }
}

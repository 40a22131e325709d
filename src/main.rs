//! # fcsframe
//!
//! Command-line front end for the `fcsframe` library.
//!
//! ## Usage
//!
//! ```bash
//! # Inspect a file
//! fcsframe info sample.fcs
//!
//! # Check file integrity
//! fcsframe validate sample.fcs
//!
//! # Parse a directory of files into saved frames, compensated
//! fcsframe convert plate1/ --output-dir frames/ --compensate
//!
//! # Gate and summarise
//! fcsframe stats sample.fcs --config panel.toml --format json
//!
//! # Events as CSV in display space
//! fcsframe export sample.fcs --display -o events.csv
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}

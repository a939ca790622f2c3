//! pdv CLI entry point.
//!
//! Parses arguments, sets up logging, runs the pipeline and reports the total
//! time spent. All failures reaching this level are configuration-level; the
//! per-project degradations are handled (and logged) further down.

use std::time::Instant;

use clap::Parser;
use colored::Colorize;
use pdv_cli::cli::Cli;
use tracing::info;

fn main() {
    let cli = Cli::parse();
    cli.init_logging();

    let start = Instant::now();
    match cli.execute() {
        Ok(()) => {
            info!("total time spent: {:.7} secs", start.elapsed().as_secs_f64());
        }
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}

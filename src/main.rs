//! headlink - Give HTML headings linkable ids
//!
//! headlink provides:
//! - In-place linking of h2/h3/h4 headings in HTML documents
//! - A lint mode for CI that reports missing and stale ids
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

mod backends;
mod cli;
mod commands;
mod core;
mod dom;
mod error;
mod linker;

/// Diagnostics go to stderr; stdout carries results only.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let _ = SimpleLogger::new()
        .with_level(level)
        .without_timestamps()
        .init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logging(cli.quiet, cli.verbose);
    cli::run(cli)
}

//! Unzipset CLI - Command-line utility for extracting sets of archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let mode = commands::OutputMode {
        verbose: cli.verbose,
        quiet: cli.quiet,
        json: cli.json,
    };

    let (operation, result) = match &cli.command {
        cli::Commands::Run(args) => ("run", commands::run::execute(args, mode)),
        cli::Commands::Extract(args) => ("extract", commands::extract::execute(args, mode)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            mode.formatter().format_error(operation, &err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so that stdout stays parseable. `RUST_LOG` refines the
/// level picked from the flags. Only the first call takes effect.
///
/// Per-job timings are logged at info. Per-entry lines only reach info in
/// verbose mode, where `TracingDiagnostics` promotes them from debug.
fn init_logging(quiet: bool) {
    let level = if quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

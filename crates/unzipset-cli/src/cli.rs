//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unzipset")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract every archive listed in a manifest
    Run(RunArgs),
    /// Extract a single archive into a directory
    Extract(ExtractArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to the TOML manifest
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Extract archives one at a time, in manifest order
    #[arg(long)]
    pub sequential: bool,

    /// Maximum number of archives extracted concurrently
    #[arg(long, value_name = "N", conflicts_with = "sequential")]
    pub max_workers: Option<NonZeroUsize>,
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Destination directory, created if missing
    #[arg(value_name = "DEST")]
    pub destination: PathBuf,

    /// Remove the destination's contents before extracting
    #[arg(long)]
    pub clean: bool,

    /// Keep files that already exist at the destination
    #[arg(long)]
    pub skip_existing: bool,
}

//! Run command implementation.

use super::OutputMode;
use super::run_jobs;
use crate::cli::RunArgs;
use crate::error::convert_extract_error;
use anyhow::Result;
use unzipset_core::Manifest;
use unzipset_core::RunOptions;

pub fn execute(args: &RunArgs, mode: OutputMode) -> Result<()> {
    let manifest = Manifest::from_path(&args.manifest).map_err(convert_extract_error)?;
    let options = run_options(&manifest, args);
    let mode = merged_mode(&manifest, mode);

    let report = run_jobs(&manifest.unzip_sets, options, mode)?;
    mode.formatter().format_run_result("run", &report)
}

/// The manifest can turn verbose output on but never off.
const fn merged_mode(manifest: &Manifest, mode: OutputMode) -> OutputMode {
    OutputMode {
        verbose: mode.verbose || manifest.verbose,
        ..mode
    }
}

/// Manifest options overridden by command-line flags.
fn run_options(manifest: &Manifest, args: &RunArgs) -> RunOptions {
    let mut options = manifest.run_options();
    if args.sequential {
        options.parallel = false;
    }
    if args.max_workers.is_some() {
        options.max_workers = args.max_workers;
    }
    options
}

//! Extract command implementation.

use super::OutputMode;
use super::run_jobs;
use crate::cli::ExtractArgs;
use anyhow::Result;
use unzipset_core::JobConfig;
use unzipset_core::RunOptions;

pub fn execute(args: &ExtractArgs, mode: OutputMode) -> Result<()> {
    let job = JobConfig::new(&args.archive, &args.destination)
        .clean_destination(args.clean)
        .replace_existing(!args.skip_existing);

    let report = run_jobs(&[job], RunOptions::sequential(), mode)?;
    mode.formatter().format_run_result("extract", &report)
}

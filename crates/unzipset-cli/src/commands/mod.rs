//! Subcommand implementations.

pub mod extract;
pub mod run;

use crate::error::convert_extract_error;
use crate::output::OutputFormatter;
use crate::output::create_formatter;
use crate::progress::CliProgress;
use anyhow::Result;
use std::sync::Arc;
use unzipset_core::JobConfig;
use unzipset_core::Orchestrator;
use unzipset_core::RunOptions;
use unzipset_core::RunReport;
use unzipset_core::TracingDiagnostics;

/// Output flags shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub verbose: bool,
    pub quiet: bool,
    pub json: bool,
}

impl OutputMode {
    /// Formatter for these flags. Build it only after every source of a
    /// flag, the manifest included, has been merged in.
    pub fn formatter(self) -> Box<dyn OutputFormatter> {
        create_formatter(self.json, self.verbose, self.quiet)
    }

    const fn show_progress(self) -> bool {
        !self.quiet && !self.json
    }
}

/// Runs `jobs`, drawing a progress bar on a terminal when requested.
fn run_jobs(jobs: &[JobConfig], options: RunOptions, mode: OutputMode) -> Result<RunReport> {
    crate::init_logging(mode.quiet);

    let diagnostics = TracingDiagnostics::new(mode.verbose);
    let orchestrator = Orchestrator::new(options);

    let orchestrator = if mode.show_progress() && jobs.len() > 1 && CliProgress::should_show() {
        orchestrator.with_diagnostics(Arc::new(CliProgress::new(jobs.len(), diagnostics)))
    } else {
        orchestrator.with_diagnostics(Arc::new(diagnostics))
    };

    orchestrator.run(jobs).map_err(convert_extract_error)
}

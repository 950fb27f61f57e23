//! Batch orchestration: validation, fan-out and error aggregation.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::AggregatedError;
use crate::Diagnostics;
use crate::ExtractionJob;
use crate::JobConfig;
use crate::JobFailure;
use crate::Result;
use crate::RunOptions;
use crate::TracingDiagnostics;
use crate::extraction::runner::JobRunner;
use crate::formats::ArchiveReader;
use crate::formats::FormatReader;
use crate::job::validate_jobs;
use crate::report::JobReport;
use crate::report::RunReport;

/// Runs a batch of extraction jobs.
///
/// The whole batch is validated before any job starts. Jobs then run on a
/// dedicated thread pool, or one after another in list order, and every
/// job runs to completion regardless of how its siblings fare.
///
/// # Examples
///
/// ```no_run
/// use unzipset_core::JobConfig;
/// use unzipset_core::Orchestrator;
/// use unzipset_core::RunOptions;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let jobs = vec![
///     JobConfig::new("dist/app.zip", "target/app").clean_destination(true),
///     JobConfig::new("dist/docs.tar.gz", "target/docs"),
/// ];
/// let report = Orchestrator::new(RunOptions::default()).run(&jobs)?;
/// println!("copied {} files", report.files_copied());
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    options: RunOptions,
    reader: Arc<dyn ArchiveReader>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Orchestrator {
    /// Creates an orchestrator with the built-in archive formats and
    /// `tracing` diagnostics.
    #[must_use]
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            reader: Arc::new(FormatReader),
            diagnostics: Arc::new(TracingDiagnostics::default()),
        }
    }

    /// Replaces the archive reader.
    #[must_use]
    pub fn with_reader(mut self, reader: Arc<dyn ArchiveReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Replaces the diagnostics sink.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns the run options.
    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Validates `configs` without extracting anything.
    ///
    /// Missing destinations are created.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, see [`validate_jobs`].
    pub fn validate(&self, configs: &[JobConfig]) -> Result<Vec<ExtractionJob>> {
        validate_jobs(configs)
    }

    /// Validates and runs every job of `configs`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the batch is rejected, in which case
    /// no job has run. Otherwise returns [`crate::ExtractError::Aggregated`]
    /// listing every failed job in input order.
    pub fn run(&self, configs: &[JobConfig]) -> Result<RunReport> {
        let start = Instant::now();
        let jobs = self.validate(configs)?;
        let runner = JobRunner::new(Arc::clone(&self.reader), Arc::clone(&self.diagnostics));

        let parallel = self.options.parallel && jobs.len() > 1;
        let outcomes = if parallel {
            self.run_parallel(&runner, &jobs)
        } else {
            run_sequential(&runner, &jobs)
        };

        let mut reports = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (job, outcome) in jobs.iter().zip(outcomes) {
            match outcome {
                Ok(report) => reports.push(report),
                Err(error) => failures.push(JobFailure {
                    source_archive: job.source_archive().to_path_buf(),
                    error,
                }),
            }
        }

        if !failures.is_empty() {
            return Err(AggregatedError::new(failures).into());
        }

        Ok(RunReport {
            jobs: reports,
            parallel,
            duration: start.elapsed(),
        })
    }

    fn run_parallel(&self, runner: &JobRunner, jobs: &[ExtractionJob]) -> Vec<Result<JobReport>> {
        let workers = self.options.worker_count(jobs.len());
        match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("unzipset-worker-{index}"))
            .build()
        {
            Ok(pool) => pool.install(|| jobs.par_iter().map(|job| runner.extract(job)).collect()),
            Err(e) => {
                tracing::warn!(error = %e, "cannot start worker pool, running jobs sequentially");
                run_sequential(runner, jobs)
            }
        }
    }
}

fn run_sequential(runner: &JobRunner, jobs: &[ExtractionJob]) -> Vec<Result<JobReport>> {
    jobs.iter().map(|job| runner.extract(job)).collect()
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(RunOptions::default())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

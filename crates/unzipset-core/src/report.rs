//! Extraction reporting.

use std::path::PathBuf;
use std::time::Duration;

use crate::ExtractionJob;

/// Statistics for a single job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    /// Archive that was extracted.
    pub source_archive: PathBuf,

    /// Directory it was extracted into.
    pub destination: PathBuf,

    /// Number of files written.
    pub files_copied: usize,

    /// Number of existing files left untouched.
    pub files_skipped: usize,

    /// Number of directories created.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Time spent cleaning the destination, if it was cleaned.
    pub clean_duration: Option<Duration>,

    /// Total duration of the job.
    pub duration: Duration,
}

impl JobReport {
    /// Creates an empty report for `job`.
    #[must_use]
    pub fn new(job: &ExtractionJob) -> Self {
        Self {
            source_archive: job.source_archive().to_path_buf(),
            destination: job.destination().to_path_buf(),
            ..Self::default()
        }
    }

    /// Returns the number of files and directories written.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_copied + self.directories_created
    }
}

/// Outcome of a successful run, one report per job in list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Per-job reports.
    pub jobs: Vec<JobReport>,

    /// Whether jobs ran concurrently.
    pub parallel: bool,

    /// Wall-clock duration of the whole run.
    pub duration: Duration,
}

impl RunReport {
    /// Total files written across all jobs.
    #[must_use]
    pub fn files_copied(&self) -> usize {
        self.jobs.iter().map(|job| job.files_copied).sum()
    }

    /// Total existing files skipped across all jobs.
    #[must_use]
    pub fn files_skipped(&self) -> usize {
        self.jobs.iter().map(|job| job.files_skipped).sum()
    }

    /// Total directories created across all jobs.
    #[must_use]
    pub fn directories_created(&self) -> usize {
        self.jobs.iter().map(|job| job.directories_created).sum()
    }

    /// Total bytes written across all jobs.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.jobs
            .iter()
            .fold(0u64, |total, job| total.saturating_add(job.bytes_written))
    }
}

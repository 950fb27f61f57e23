//! Diagnostic reporting for extraction runs.
//!
//! Every job receives a [`Diagnostics`] sink. It is advisory only: nothing
//! a sink does can change the outcome of a job.

use std::io;
use std::path::Path;
use std::time::Duration;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::ExtractError;
use crate::ExtractionJob;

/// Receives progress and timing events from running jobs.
///
/// Jobs may run concurrently, so a sink is shared between worker threads.
///
/// # Examples
///
/// ```
/// use std::io;
/// use std::path::Path;
/// use std::sync::atomic::AtomicUsize;
/// use std::sync::atomic::Ordering;
/// use std::time::Duration;
/// use unzipset_core::Diagnostics;
/// use unzipset_core::ExtractError;
/// use unzipset_core::ExtractionJob;
///
/// #[derive(Default)]
/// struct FileCounter(AtomicUsize);
///
/// impl Diagnostics for FileCounter {
///     fn job_started(&self, _job: &ExtractionJob) {}
///     fn destination_cleaned(&self, _destination: &Path, _elapsed: Duration) {}
///     fn directory_created(&self, _path: &Path) {}
///     fn file_copied(&self, _path: &Path, _bytes: u64) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
///     fn file_skipped(&self, _path: &Path) {}
///     fn release_failed(&self, _archive: &Path, _error: &io::Error) {}
///     fn job_finished(&self, _job: &ExtractionJob, _elapsed: Duration, _error: Option<&ExtractError>) {}
/// }
/// ```
pub trait Diagnostics: Send + Sync {
    /// Called before a job touches the filesystem.
    fn job_started(&self, job: &ExtractionJob);

    /// Called once the destination of a job has been emptied.
    fn destination_cleaned(&self, destination: &Path, elapsed: Duration);

    /// Called for every directory created at a destination.
    fn directory_created(&self, path: &Path);

    /// Called for every file written to a destination.
    fn file_copied(&self, path: &Path, bytes: u64);

    /// Called for every existing file left untouched.
    fn file_skipped(&self, path: &Path);

    /// Called when releasing an archive failed. The job outcome is not
    /// affected.
    fn release_failed(&self, archive: &Path, error: &io::Error);

    /// Called when a job ends, successfully or not.
    fn job_finished(&self, job: &ExtractionJob, elapsed: Duration, error: Option<&ExtractError>);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn job_started(&self, _job: &ExtractionJob) {}

    fn destination_cleaned(&self, _destination: &Path, _elapsed: Duration) {}

    fn directory_created(&self, _path: &Path) {}

    fn file_copied(&self, _path: &Path, _bytes: u64) {}

    fn file_skipped(&self, _path: &Path) {}

    fn release_failed(&self, _archive: &Path, _error: &io::Error) {}

    fn job_finished(
        &self,
        _job: &ExtractionJob,
        _elapsed: Duration,
        _error: Option<&ExtractError>,
    ) {
    }
}

/// Sink that emits `tracing` events.
///
/// Timing lines are logged at `info`. Per-entry lines are logged at `debug`,
/// or at `info` when `verbose` is set, so they show up without enabling
/// debug logging globally.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics {
    verbose: bool,
}

impl TracingDiagnostics {
    /// Creates a sink; `verbose` promotes per-entry lines to `info`.
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

macro_rules! entry_event {
    ($self:ident, $($arg:tt)+) => {
        if $self.verbose {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

impl Diagnostics for TracingDiagnostics {
    fn job_started(&self, job: &ExtractionJob) {
        debug!(
            archive = %job.source_archive().display(),
            destination = %job.destination().display(),
            clean = job.clean_destination(),
            policy = ?job.overwrite_policy(),
            "starting extraction"
        );
    }

    fn destination_cleaned(&self, destination: &Path, elapsed: Duration) {
        info!(
            destination = %destination.display(),
            elapsed_ms = millis(elapsed),
            "cleaned destination"
        );
    }

    fn directory_created(&self, path: &Path) {
        entry_event!(self, path = %path.display(), "created directory");
    }

    fn file_copied(&self, path: &Path, bytes: u64) {
        entry_event!(self, path = %path.display(), bytes, "copied file");
    }

    fn file_skipped(&self, path: &Path) {
        entry_event!(self, path = %path.display(), "skipped existing file");
    }

    fn release_failed(&self, archive: &Path, error: &io::Error) {
        error!(archive = %archive.display(), %error, "cannot close archive");
    }

    fn job_finished(&self, job: &ExtractionJob, elapsed: Duration, error: Option<&ExtractError>) {
        let archive = job.source_archive().display();
        let elapsed_ms = millis(elapsed);
        match error {
            None => info!(%archive, elapsed_ms, "completed extraction"),
            Some(error) => warn!(%archive, elapsed_ms, %error, "extraction failed"),
        }
    }
}

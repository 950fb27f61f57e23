//! Execution of a single extraction job.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::Diagnostics;
use crate::ExtractError;
use crate::ExtractionJob;
use crate::Result;
use crate::extraction::clean::clean_directory;
use crate::extraction::copier::TreeCopier;
use crate::formats::ArchiveReader;
use crate::formats::EntryReader;
use crate::formats::OpenArchive;
use crate::report::JobReport;

/// Runs one validated job end to end: clean, open, copy, release.
///
/// A runner is cheap to clone and can be shared by every worker of a run.
#[derive(Clone)]
pub struct JobRunner {
    reader: Arc<dyn ArchiveReader>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl JobRunner {
    /// Creates a runner opening archives with `reader` and reporting to
    /// `diagnostics`.
    #[must_use]
    pub fn new(reader: Arc<dyn ArchiveReader>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            reader,
            diagnostics,
        }
    }

    /// Extracts `job`.
    ///
    /// The archive handle is released on every exit path. A failed release
    /// goes to the diagnostics sink and does not change the result. The
    /// total elapsed time is reported whatever the outcome.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::CleanFailed`] if the destination cannot be emptied
    /// - [`ExtractError::ArchiveOpenFailed`] if the archive cannot be read
    /// - [`ExtractError::DirectoryCreateFailed`] or
    ///   [`ExtractError::FileCopyFailed`] from the tree copy
    pub fn extract(&self, job: &ExtractionJob) -> Result<JobReport> {
        let start = Instant::now();
        self.diagnostics.job_started(job);

        let mut report = JobReport::new(job);
        let result = self.extract_into(job, &mut report);
        report.duration = start.elapsed();

        self.diagnostics
            .job_finished(job, report.duration, result.as_ref().err());
        result.map(|()| report)
    }

    fn extract_into(&self, job: &ExtractionJob, report: &mut JobReport) -> Result<()> {
        if job.clean_destination() {
            let clean_start = Instant::now();
            clean_directory(job.destination()).map_err(|source| ExtractError::CleanFailed {
                path: job.destination().to_path_buf(),
                source,
            })?;
            let elapsed = clean_start.elapsed();
            report.clean_duration = Some(elapsed);
            self.diagnostics.destination_cleaned(job.destination(), elapsed);
        }

        let archive = self
            .reader
            .open(job.source_archive())
            .map_err(|source| ExtractError::ArchiveOpenFailed {
                path: job.source_archive().to_path_buf(),
                source,
            })?;
        let mut archive = ReleaseGuard {
            archive,
            path: job.source_archive(),
            diagnostics: self.diagnostics.as_ref(),
        };

        let OpenArchive { roots, contents } = &mut archive.archive;
        let mut copier = TreeCopier::new(
            contents.as_mut(),
            job.overwrite_policy(),
            self.diagnostics.as_ref(),
        );
        for root in roots.iter() {
            copier.copy(root, job.destination(), report)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner").finish_non_exhaustive()
    }
}

/// Closes an opened archive when dropped.
struct ReleaseGuard<'a> {
    archive: OpenArchive,
    path: &'a Path,
    diagnostics: &'a dyn Diagnostics,
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.archive.contents.close() {
            self.diagnostics.release_failed(self.path, &error);
        }
    }
}

//! Error types for batch archive extraction.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractError`.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised by an archive reader while opening or browsing an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Archive format is unsupported or unrecognized.
    #[error("unsupported archive format")]
    UnsupportedFormat,

    /// Archive is corrupted or invalid.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// An entry name would resolve outside of the archive root.
    #[error("unsafe entry name: {name}")]
    UnsafeEntryName {
        /// The entry name as stored in the archive.
        name: String,
    },
}

/// Errors that can occur while validating or running extraction jobs.
///
/// Variants fall into three groups:
/// - validation errors, which abort the whole run before anything is
///   extracted
/// - job errors, which abort a single job while sibling jobs complete
/// - [`ExtractError::Aggregated`], which wraps every failed job of a run
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The source archive does not exist.
    #[error("source archive not found: {path}")]
    SourceNotFound {
        /// Path of the missing archive.
        path: PathBuf,
    },

    /// The destination does not exist and could not be created.
    #[error("destination {path} does not exist and could not be created: {source}")]
    DestinationUnavailable {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The destination exists but is not a directory.
    #[error("destination has to be a directory, but is a file: {path}")]
    DestinationIsFile {
        /// Destination path.
        path: PathBuf,
    },

    /// Removing the previous contents of the destination failed.
    #[error("failed to clean destination {path}: {source}")]
    CleanFailed {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The archive could not be opened as a browsable tree.
    #[error("failed to open archive {path}: {source}")]
    ArchiveOpenFailed {
        /// Archive path.
        path: PathBuf,
        /// Reader failure.
        #[source]
        source: ArchiveError,
    },

    /// A directory from the archive could not be created at the destination.
    #[error("sub-directory {path} cannot be created: {source}")]
    DirectoryCreateFailed {
        /// Directory path at the destination.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A file from the archive could not be written to the destination.
    #[error("failed to copy file to {path}: {source}")]
    FileCopyFailed {
        /// File path at the destination.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The run manifest could not be loaded.
    #[error("invalid manifest {path}: {reason}")]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// One or more jobs of a run failed.
    #[error(transparent)]
    Aggregated(#[from] AggregatedError),
}

impl ExtractError {
    /// Returns `true` for errors raised while validating the job list.
    ///
    /// # Examples
    ///
    /// ```
    /// use unzipset_core::ExtractError;
    /// use std::path::PathBuf;
    ///
    /// let err = ExtractError::SourceNotFound {
    ///     path: PathBuf::from("missing.zip"),
    /// };
    /// assert!(err.is_validation_error());
    /// assert!(!err.is_job_error());
    /// ```
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. }
                | Self::DestinationUnavailable { .. }
                | Self::DestinationIsFile { .. }
        )
    }

    /// Returns `true` for errors that abort a single job only.
    #[must_use]
    pub const fn is_job_error(&self) -> bool {
        matches!(
            self,
            Self::CleanFailed { .. }
                | Self::ArchiveOpenFailed { .. }
                | Self::DirectoryCreateFailed { .. }
                | Self::FileCopyFailed { .. }
        )
    }

    /// Returns the aggregated job failures, if this is a run-level error.
    #[must_use]
    pub const fn aggregated(&self) -> Option<&AggregatedError> {
        match self {
            Self::Aggregated(aggregated) => Some(aggregated),
            _ => None,
        }
    }
}

/// A job that failed during the execution pass.
#[derive(Debug)]
pub struct JobFailure {
    /// Archive the failing job was extracting.
    pub source_archive: PathBuf,
    /// Why it failed.
    pub error: ExtractError,
}

/// Every job failure of a run, in job list order.
#[derive(Debug)]
pub struct AggregatedError {
    failures: Vec<JobFailure>,
}

impl AggregatedError {
    /// Wraps the failures of a run.
    #[must_use]
    pub fn new(failures: Vec<JobFailure>) -> Self {
        Self { failures }
    }

    /// Returns the individual failures.
    #[must_use]
    pub fn failures(&self) -> &[JobFailure] {
        &self.failures
    }

    /// Returns the number of failed jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Returns `true` if no job failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to complete the extraction of {} archive(s)",
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(
                f,
                "; {}: {}",
                failure.source_archive.display(),
                failure.error
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregatedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|failure| &failure.error as &(dyn std::error::Error + 'static))
    }
}

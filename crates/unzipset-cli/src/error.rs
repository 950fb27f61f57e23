//! Error conversion utilities for CLI.
//!
//! Converts unzipset-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::fmt::Write;
use unzipset_core::ArchiveError;
use unzipset_core::ExtractError;

/// Converts `ExtractError` to user-friendly anyhow error with context
pub fn convert_extract_error(err: ExtractError) -> anyhow::Error {
    match err {
        ExtractError::SourceNotFound { path } => {
            anyhow!(
                "Source archive not found: {}\n\
                 HINT: Nothing was extracted. Check the path, relative paths in a manifest \
                 are resolved against the manifest's directory.",
                path.display()
            )
        }
        ExtractError::DestinationIsFile { path } => {
            anyhow!(
                "Destination has to be a directory, but is a file: {}\n\
                 HINT: Nothing was extracted. Remove the file or choose another destination.",
                path.display()
            )
        }
        ExtractError::DestinationUnavailable { path, source } => {
            anyhow!(
                "Destination {} does not exist and could not be created: {source}\n\
                 HINT: Nothing was extracted. Check that the parent directory is writable.",
                path.display()
            )
        }
        ExtractError::Manifest { path, reason } => {
            anyhow!(
                "Invalid manifest '{}': {reason}\n\
                 HINT: Each [[unzip_set]] needs source_archive and destination; \
                 optional keys are clean_destination and replace_existing.",
                path.display()
            )
        }
        ExtractError::Aggregated(aggregated) => {
            let mut message = format!(
                "{} of the requested archives failed to extract:",
                aggregated.len()
            );
            for failure in aggregated.failures() {
                let _ = write!(
                    message,
                    "\n  - {}: {}",
                    failure.source_archive.display(),
                    describe_job_error(&failure.error)
                );
            }
            anyhow!(message)
        }
        other => anyhow!("{}", describe_job_error(&other)),
    }
}

/// One-line description of a job failure, with a hint where one helps.
fn describe_job_error(err: &ExtractError) -> String {
    match err {
        ExtractError::ArchiveOpenFailed {
            source: ArchiveError::UnsupportedFormat,
            ..
        } => format!(
            "{err}\n    HINT: Supported formats: zip, jar, war, ear, tar, tar.gz, tar.bz2, tar.xz, tar.zst"
        ),
        ExtractError::ArchiveOpenFailed {
            source: ArchiveError::InvalidArchive(_),
            ..
        } => format!("{err}\n    HINT: The archive may be corrupted or truncated."),
        ExtractError::ArchiveOpenFailed {
            source: ArchiveError::UnsafeEntryName { .. },
            ..
        } => format!(
            "{err}\n    HINT: The archive has entries pointing outside the destination. \
             Do not extract from untrusted sources."
        ),
        ExtractError::CleanFailed { .. } => {
            format!("{err}\n    HINT: Check that nothing holds files open in the destination.")
        }
        _ => err.to_string(),
    }
}

//! Validated extraction jobs.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::ExtractError;
use crate::JobConfig;
use crate::Result;

/// What to do with a file that already exists at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace the existing file with the archive's copy.
    Replace,
    /// Leave the existing file untouched.
    Skip,
}

impl OverwritePolicy {
    /// Maps the `replace_existing` flag to a policy.
    #[must_use]
    pub const fn from_replace_existing(replace_existing: bool) -> Self {
        if replace_existing {
            Self::Replace
        } else {
            Self::Skip
        }
    }
}

/// One validated unit of work.
///
/// Only obtainable through [`validate_jobs`], which guarantees that the
/// source archive existed and that the destination was a directory at
/// validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    source_archive: PathBuf,
    destination: PathBuf,
    clean_destination: bool,
    overwrite: OverwritePolicy,
}

impl ExtractionJob {
    /// Archive to extract.
    #[must_use]
    pub fn source_archive(&self) -> &Path {
        &self.source_archive
    }

    /// Directory to extract into.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Whether the destination is emptied before extraction.
    #[must_use]
    pub const fn clean_destination(&self) -> bool {
        self.clean_destination
    }

    /// Policy applied to files that already exist.
    #[must_use]
    pub const fn overwrite_policy(&self) -> OverwritePolicy {
        self.overwrite
    }
}

/// Validates a batch of job configurations.
///
/// Checks run in two phases. First every job is checked without touching
/// the filesystem: the source archive must exist and an existing
/// destination must be a directory. Only when the whole batch passes are
/// missing destinations created, in list order. A batch that fails
/// validation therefore leaves the filesystem as it found it, except for
/// destinations created before a creation failure.
///
/// # Errors
///
/// Returns the first failure found:
/// - [`ExtractError::SourceNotFound`]
/// - [`ExtractError::DestinationIsFile`]
/// - [`ExtractError::DestinationUnavailable`]
pub fn validate_jobs(configs: &[JobConfig]) -> Result<Vec<ExtractionJob>> {
    for config in configs {
        verify_source(&config.source_archive)?;
        verify_existing_destination(&config.destination)?;
    }

    configs
        .iter()
        .map(|config| {
            prepare_destination(&config.destination)?;
            Ok(ExtractionJob {
                source_archive: config.source_archive.clone(),
                destination: config.destination.clone(),
                clean_destination: config.clean_destination,
                overwrite: OverwritePolicy::from_replace_existing(config.replace_existing),
            })
        })
        .collect()
}

fn verify_source(path: &Path) -> Result<()> {
    // An undeterminable state is left for the archive reader to report.
    if matches!(path.try_exists(), Ok(false)) {
        return Err(ExtractError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn verify_existing_destination(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(ExtractError::DestinationIsFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn prepare_destination(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|source| ExtractError::DestinationUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
    }
    if !path.is_dir() {
        return Err(ExtractError::DestinationIsFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_valid_job_creates_destination() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.zip");
        touch(&archive);
        let dest = temp.path().join("nested/out");

        let config = JobConfig::new(&archive, &dest)
            .clean_destination(true)
            .replace_existing(false);
        let jobs = validate_jobs(&[config]).unwrap();

        assert!(dest.is_dir());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].source_archive(), archive);
        assert_eq!(jobs[0].destination(), dest);
        assert!(jobs[0].clean_destination());
        assert_eq!(jobs[0].overwrite_policy(), OverwritePolicy::Skip);
    }

    #[test]
    fn test_missing_source_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.zip");
        touch(&archive);

        let first = JobConfig::new(&archive, temp.path().join("out1"));
        let second = JobConfig::new(temp.path().join("missing.zip"), temp.path().join("out2"));

        let err = validate_jobs(&[first, second]).unwrap_err();
        assert!(matches!(err, ExtractError::SourceNotFound { ref path } if path.ends_with("missing.zip")));
        assert!(!temp.path().join("out1").exists());
        assert!(!temp.path().join("out2").exists());
    }

    #[test]
    fn test_destination_is_file() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.zip");
        touch(&archive);
        let dest = temp.path().join("out.txt");
        touch(&dest);

        let err = validate_jobs(&[JobConfig::new(&archive, &dest)]).unwrap_err();
        assert!(matches!(err, ExtractError::DestinationIsFile { .. }));
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_destination_unavailable() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.zip");
        touch(&archive);
        let blocker = temp.path().join("blocker");
        touch(&blocker);

        // A regular file in the middle of the path makes creation impossible.
        let dest = blocker.join("out");
        let err = validate_jobs(&[JobConfig::new(&archive, &dest)]).unwrap_err();
        assert!(matches!(err, ExtractError::DestinationUnavailable { .. }));
    }

    #[test]
    fn test_shared_destination_validates() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.zip");
        touch(&archive);
        let dest = temp.path().join("out");

        let jobs = validate_jobs(&[
            JobConfig::new(&archive, &dest),
            JobConfig::new(&archive, &dest),
        ])
        .unwrap();
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn test_empty_batch() {
        assert!(validate_jobs(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_policy_mapping() {
        assert_eq!(
            OverwritePolicy::from_replace_existing(true),
            OverwritePolicy::Replace
        );
        assert_eq!(
            OverwritePolicy::from_replace_existing(false),
            OverwritePolicy::Skip
        );
    }
}

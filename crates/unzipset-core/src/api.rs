//! High-level public API for batch extraction.

use std::path::Path;
use std::sync::Arc;

use crate::JobConfig;
use crate::Manifest;
use crate::Orchestrator;
use crate::Result;
use crate::RunOptions;
use crate::RunReport;
use crate::TracingDiagnostics;

/// Extracts every job of `jobs` with the built-in archive formats.
///
/// This is the main entry point for callers that build their job list in
/// code. Diagnostics go to `tracing`.
///
/// # Errors
///
/// Returns a validation error if any job is rejected up front, in which
/// case nothing is extracted, or [`crate::ExtractError::Aggregated`] if
/// one or more jobs failed.
///
/// # Examples
///
/// ```no_run
/// use unzipset_core::JobConfig;
/// use unzipset_core::RunOptions;
/// use unzipset_core::extract_all;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let jobs = [JobConfig::new("app.jar", "deploy/app").replace_existing(false)];
/// let report = extract_all(&jobs, RunOptions::sequential())?;
/// println!("Extracted {} files", report.files_copied());
/// # Ok(())
/// # }
/// ```
pub fn extract_all(jobs: &[JobConfig], options: RunOptions) -> Result<RunReport> {
    Orchestrator::new(options).run(jobs)
}

/// Loads a TOML manifest and runs the jobs it lists.
///
/// The manifest's `verbose` flag controls how chatty the `tracing`
/// diagnostics are.
///
/// # Errors
///
/// Returns [`crate::ExtractError::Manifest`] if the manifest cannot be
/// loaded, otherwise the same errors as [`extract_all`].
pub fn extract_manifest<P: AsRef<Path>>(manifest: P) -> Result<RunReport> {
    let manifest = Manifest::from_path(manifest)?;
    Orchestrator::new(manifest.run_options())
        .with_diagnostics(Arc::new(TracingDiagnostics::new(manifest.verbose)))
        .run(&manifest.unzip_sets)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ExtractError;
    use crate::test_utils::create_test_zip;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_all() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.zip");
        fs::write(&archive, create_test_zip(&[("a/b.txt", "hello")])).unwrap();

        let report = extract_all(
            &[JobConfig::new(&archive, temp.path().join("out"))],
            RunOptions::default(),
        )
        .unwrap();

        assert_eq!(report.files_copied(), 1);
        assert_eq!(
            fs::read_to_string(temp.path().join("out/a/b.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_extract_manifest_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("lib.zip"),
            create_test_zip(&[("lib/core.txt", "core")]),
        )
        .unwrap();
        let manifest = temp.path().join("unzipset.toml");
        fs::write(
            &manifest,
            "parallel = false\n\n[[unzip_set]]\nsource_archive = \"lib.zip\"\ndestination = \"out\"\n",
        )
        .unwrap();

        let report = extract_manifest(&manifest).unwrap();

        assert!(!report.parallel);
        assert!(temp.path().join("out/lib/core.txt").exists());
    }

    #[test]
    fn test_extract_manifest_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = extract_manifest(temp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ExtractError::Manifest { .. }));
    }
}

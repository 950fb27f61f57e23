//! Job and run configuration.
//!
//! [`JobConfig`] is the unvalidated record describing one archive to
//! extract. A [`Manifest`] groups several of them together with the run
//! options and is usually loaded from a TOML file:
//!
//! ```toml
//! parallel = true
//!
//! [[unzip_set]]
//! source_archive = "dist/app.zip"
//! destination = "target/app"
//! clean_destination = true
//! ```

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ExtractError;
use crate::Result;

/// Configuration of a single archive extraction.
///
/// Defaults: `clean_destination = false`, `replace_existing = true`.
///
/// # Examples
///
/// ```
/// use unzipset_core::JobConfig;
///
/// let job = JobConfig::new("dist/app.zip", "target/app")
///     .clean_destination(true)
///     .replace_existing(false);
/// assert!(job.clean_destination);
/// assert!(!job.replace_existing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Archive to extract.
    pub source_archive: PathBuf,

    /// Directory the archive is extracted into.
    pub destination: PathBuf,

    /// Remove everything inside `destination` before extracting.
    #[serde(default)]
    pub clean_destination: bool,

    /// Overwrite files that already exist at the destination. When `false`
    /// existing files are skipped.
    #[serde(default = "default_true")]
    pub replace_existing: bool,
}

impl JobConfig {
    /// Creates a job configuration with default policies.
    #[must_use]
    pub fn new(source_archive: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_archive: source_archive.into(),
            destination: destination.into(),
            clean_destination: false,
            replace_existing: true,
        }
    }

    /// Sets whether the destination is cleaned first.
    #[must_use]
    pub fn clean_destination(mut self, clean: bool) -> Self {
        self.clean_destination = clean;
        self
    }

    /// Sets whether existing files are replaced.
    #[must_use]
    pub fn replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = replace;
        self
    }

    fn resolve_against(&mut self, base: &Path) {
        if self.source_archive.is_relative() {
            self.source_archive = base.join(&self.source_archive);
        }
        if self.destination.is_relative() {
            self.destination = base.join(&self.destination);
        }
    }
}

/// Options controlling how a batch of jobs is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Run jobs concurrently on a worker pool.
    pub parallel: bool,

    /// Upper bound on worker threads. `None` uses the available parallelism.
    pub max_workers: Option<NonZeroUsize>,
}

impl Default for RunOptions {
    /// Parallel execution with as many workers as the machine offers.
    fn default() -> Self {
        Self {
            parallel: true,
            max_workers: None,
        }
    }
}

impl RunOptions {
    /// Options for strictly sequential execution.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            max_workers: None,
        }
    }

    /// Number of workers to use for `job_count` jobs.
    #[must_use]
    pub fn worker_count(&self, job_count: usize) -> usize {
        let cap = self.max_workers.map_or_else(
            || std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            NonZeroUsize::get,
        );
        job_count.min(cap).max(1)
    }
}

/// A run description: the unzip sets plus execution options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Extract the unzip sets concurrently.
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Promote per-entry trace lines to the default log level.
    #[serde(default)]
    pub verbose: bool,

    /// Upper bound on worker threads.
    #[serde(default)]
    pub max_workers: Option<NonZeroUsize>,

    /// Archives to extract, in order.
    #[serde(default, rename = "unzip_set")]
    pub unzip_sets: Vec<JobConfig>,
}

impl Manifest {
    /// Loads a manifest from a TOML file.
    ///
    /// Relative archive and destination paths are resolved against the
    /// directory containing the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Manifest`] if the file cannot be read or is
    /// not a valid manifest.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ExtractError::Manifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut manifest = Self::parse(&text).map_err(|reason| ExtractError::Manifest {
            path: path.to_path_buf(),
            reason,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for job in &mut manifest.unzip_sets {
            job.resolve_against(base);
        }
        Ok(manifest)
    }

    /// Parses a manifest from TOML text without resolving paths.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Manifest`] for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::parse(text).map_err(|reason| ExtractError::Manifest {
            path: PathBuf::from("<inline>"),
            reason,
        })
    }

    /// Execution options described by this manifest.
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            parallel: self.parallel,
            max_workers: self.max_workers,
        }
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        toml::from_str(text).map_err(|e| e.message().to_string())
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_job_config_defaults() {
        let job = JobConfig::new("a.zip", "out");
        assert!(!job.clean_destination);
        assert!(job.replace_existing);
    }

    #[test]
    fn test_manifest_defaults() {
        let manifest = Manifest::from_toml_str(
            r#"
            [[unzip_set]]
            source_archive = "a.zip"
            destination = "out"
            "#,
        )
        .unwrap();

        assert!(manifest.parallel);
        assert!(!manifest.verbose);
        assert_eq!(manifest.max_workers, None);
        assert_eq!(manifest.unzip_sets, vec![JobConfig::new("a.zip", "out")]);
    }

    #[test]
    fn test_manifest_explicit_values() {
        let manifest = Manifest::from_toml_str(
            r#"
            parallel = false
            verbose = true
            max_workers = 2

            [[unzip_set]]
            source_archive = "a.zip"
            destination = "out/a"
            clean_destination = true
            replace_existing = false

            [[unzip_set]]
            source_archive = "b.tar.gz"
            destination = "out/b"
            "#,
        )
        .unwrap();

        assert!(!manifest.parallel);
        assert!(manifest.verbose);
        assert_eq!(manifest.max_workers, NonZeroUsize::new(2));
        assert_eq!(manifest.unzip_sets.len(), 2);
        assert!(manifest.unzip_sets[0].clean_destination);
        assert!(!manifest.unzip_sets[0].replace_existing);
        assert!(manifest.unzip_sets[1].replace_existing);

        let options = manifest.run_options();
        assert!(!options.parallel);
        assert_eq!(options.worker_count(10), 2);
    }

    #[test]
    fn test_manifest_rejects_unknown_keys() {
        let result = Manifest::from_toml_str(
            r#"
            [[unzip_set]]
            source_archive = "a.zip"
            destination = "out"
            overwrite = true
            "#,
        );
        assert!(matches!(result, Err(ExtractError::Manifest { .. })));
    }

    #[test]
    fn test_manifest_requires_destination() {
        let result = Manifest::from_toml_str(
            r#"
            [[unzip_set]]
            source_archive = "a.zip"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_manifest_from_path_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let manifest_path = temp.path().join("unzipset.toml");
        fs::write(
            &manifest_path,
            r#"
            [[unzip_set]]
            source_archive = "dist/a.zip"
            destination = "/abs/out"
            "#,
        )
        .unwrap();

        let manifest = Manifest::from_path(&manifest_path).unwrap();
        let job = &manifest.unzip_sets[0];
        assert_eq!(job.source_archive, temp.path().join("dist/a.zip"));
        assert_eq!(job.destination, PathBuf::from("/abs/out"));
    }

    #[test]
    fn test_manifest_from_missing_path() {
        let result = Manifest::from_path("/nonexistent/unzipset.toml");
        assert!(matches!(result, Err(ExtractError::Manifest { .. })));
    }

    #[test]
    fn test_worker_count_bounds() {
        let options = RunOptions {
            parallel: true,
            max_workers: NonZeroUsize::new(4),
        };
        assert_eq!(options.worker_count(0), 1);
        assert_eq!(options.worker_count(3), 3);
        assert_eq!(options.worker_count(9), 4);
        assert!(RunOptions::default().worker_count(1) >= 1);
        assert!(!RunOptions::sequential().parallel);
    }
}

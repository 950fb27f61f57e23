//! Progress bar implementation for CLI runs.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::io;
use std::path::Path;
use std::time::Duration;
use unzipset_core::Diagnostics;
use unzipset_core::ExtractError;
use unzipset_core::ExtractionJob;
use unzipset_core::TracingDiagnostics;

/// CLI progress bar wrapper implementing `Diagnostics`.
///
/// Counts finished archives while forwarding every event to the `tracing`
/// sink. Log lines are printed above the bar instead of through it.
pub struct CliProgress {
    bar: ProgressBar,
    inner: TracingDiagnostics,
}

impl CliProgress {
    /// Creates a progress bar for `total` archives.
    #[must_use]
    pub fn new(total: usize, inner: TracingDiagnostics) -> Self {
        let bar = ProgressBar::new(total as u64);

        // Template: "Extracting [████████░░░░] 3/8 archives (2s) app.zip"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("Extracting [{bar:40.cyan/blue}] {pos}/{len} archives ({elapsed}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        Self { bar, inner }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl Diagnostics for CliProgress {
    fn job_started(&self, job: &ExtractionJob) {
        if let Some(name) = job.source_archive().file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
        self.bar.suspend(|| self.inner.job_started(job));
    }

    fn destination_cleaned(&self, destination: &Path, elapsed: Duration) {
        self.bar
            .suspend(|| self.inner.destination_cleaned(destination, elapsed));
    }

    fn directory_created(&self, path: &Path) {
        self.bar.suspend(|| self.inner.directory_created(path));
    }

    fn file_copied(&self, path: &Path, bytes: u64) {
        self.bar.suspend(|| self.inner.file_copied(path, bytes));
    }

    fn file_skipped(&self, path: &Path) {
        self.bar.suspend(|| self.inner.file_skipped(path));
    }

    fn release_failed(&self, archive: &Path, error: &io::Error) {
        self.bar.suspend(|| self.inner.release_failed(archive, error));
    }

    fn job_finished(&self, job: &ExtractionJob, elapsed: Duration, error: Option<&ExtractError>) {
        self.bar
            .suspend(|| self.inner.job_finished(job, elapsed, error));
        self.bar.inc(1);
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Converts duration to human-readable format.
pub fn humanize_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{secs}s")
    } else {
        format!("{millis}ms")
    }
}

//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::time::Duration;
use unzipset_core::JobReport;
use unzipset_core::RunReport;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JobOutput {
    source_archive: String,
    destination: String,
    files_copied: usize,
    files_skipped: usize,
    directories_created: usize,
    bytes_written: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    clean_ms: Option<u128>,
    duration_ms: u128,
}

#[derive(Serialize)]
struct RunOutput {
    parallel: bool,
    archives: usize,
    files_copied: usize,
    files_skipped: usize,
    directories_created: usize,
    bytes_written: u64,
    duration_ms: u128,
    jobs: Vec<JobOutput>,
}

impl From<&JobReport> for JobOutput {
    fn from(report: &JobReport) -> Self {
        Self {
            source_archive: report.source_archive.display().to_string(),
            destination: report.destination.display().to_string(),
            files_copied: report.files_copied,
            files_skipped: report.files_skipped,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            clean_ms: report.clean_duration.as_ref().map(Duration::as_millis),
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_run_result(&self, operation: &str, report: &RunReport) -> Result<()> {
        let data = RunOutput {
            parallel: report.parallel,
            archives: report.jobs.len(),
            files_copied: report.files_copied(),
            files_skipped: report.files_skipped(),
            directories_created: report.directories_created(),
            bytes_written: report.bytes_written(),
            duration_ms: report.duration.as_millis(),
            jobs: report.jobs.iter().map(JobOutput::from).collect(),
        };

        Self::output(&JsonOutput::success(operation, data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}

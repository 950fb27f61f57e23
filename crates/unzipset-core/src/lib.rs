//! Batch extraction of archives into destination directories.
//!
//! `unzipset-core` takes a list of extraction jobs, each naming an archive
//! and a destination directory, validates the whole list up front and then
//! extracts every archive, optionally in parallel. Destinations can be
//! emptied first, and existing files are either replaced or kept. Every
//! failed job is reported together once the batch has finished.
//!
//! ZIP (including JAR, WAR and EAR) and tar archives, plain or compressed
//! with gzip, bzip2, xz or zstd, are supported out of the box; other
//! formats plug in through [`ArchiveReader`].
//!
//! # Examples
//!
//! ```no_run
//! use unzipset_core::JobConfig;
//! use unzipset_core::RunOptions;
//! use unzipset_core::extract_all;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let jobs = [
//!     JobConfig::new("dist/server.zip", "deploy/server").clean_destination(true),
//!     JobConfig::new("dist/plugins.tar.gz", "deploy/plugins").replace_existing(false),
//! ];
//! let report = extract_all(&jobs, RunOptions::default())?;
//! println!("Extracted {} files", report.files_copied());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod copy;
pub mod diagnostics;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod job;
pub mod report;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::extract_all;
pub use api::extract_manifest;
pub use config::JobConfig;
pub use config::Manifest;
pub use config::RunOptions;
pub use diagnostics::Diagnostics;
pub use diagnostics::NoopDiagnostics;
pub use diagnostics::TracingDiagnostics;
pub use error::AggregatedError;
pub use error::ArchiveError;
pub use error::ExtractError;
pub use error::JobFailure;
pub use error::Result;
pub use extraction::JobRunner;
pub use extraction::Orchestrator;
pub use extraction::TreeCopier;
pub use formats::ArchiveReader;
pub use formats::FormatReader;
pub use job::ExtractionJob;
pub use job::OverwritePolicy;
pub use job::validate_jobs;
pub use report::JobReport;
pub use report::RunReport;

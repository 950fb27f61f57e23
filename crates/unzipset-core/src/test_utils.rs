//! Test utilities: in-memory archives, a recording diagnostics sink and
//! directory snapshots.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::io;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use walkdir::WalkDir;

use crate::Diagnostics;
use crate::ExtractError;
use crate::ExtractionJob;
use crate::error::ArchiveError;
use crate::formats::ArchiveReader;
use crate::formats::EntryReader;
use crate::formats::FormatReader;
use crate::formats::OpenArchive;
use crate::formats::VirtualFile;

/// Creates an in-memory TAR archive from `(path, text)` pairs.
#[must_use]
pub fn create_test_tar(entries: &[(&str, &str)]) -> Vec<u8> {
    entries
        .iter()
        .fold(TarTestBuilder::new(), |builder, (path, text)| {
            builder.add_file(path, text.as_bytes())
        })
        .build()
}

/// Creates an in-memory ZIP archive from `(path, text)` pairs.
///
/// Files are stored uncompressed with mode 0o644.
///
/// # Examples
///
/// ```
/// use unzipset_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(&[("file.txt", "hello"), ("dir/nested.txt", "world")]);
/// assert!(!zip_data.is_empty());
/// ```
#[must_use]
pub fn create_test_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    entries
        .iter()
        .fold(ZipTestBuilder::new(), |builder, (path, text)| {
            builder.add_file(path, text.as_bytes())
        })
        .build()
}

/// Builder for TAR test archives with files, directories and symlinks.
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new TAR test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file with mode 0o644.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with a custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_mtime(1_600_000_000);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o777);
        header.set_entry_type(tar::EntryType::Symlink);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, io::empty())
            .unwrap();
        self
    }

    /// Builds and returns the TAR archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ZIP test archives.
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new ZIP test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn file_options() -> zip::write::SimpleFileOptions {
        zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(0o644)
    }

    /// Adds a regular file.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        self.zip.start_file(path, Self::file_options()).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a regular file with an explicit DOS modification time.
    #[must_use]
    pub fn add_file_with_time(mut self, path: &str, data: &[u8], time: zip::DateTime) -> Self {
        let options = Self::file_options().last_modified_time(time);
        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Builds and returns the ZIP archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Something a [`RecordingDiagnostics`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// A job began.
    JobStarted(PathBuf),
    /// A destination was cleaned.
    DestinationCleaned(PathBuf),
    /// A directory was created.
    DirectoryCreated(PathBuf),
    /// A file was written.
    FileCopied(PathBuf, u64),
    /// An existing file was left alone.
    FileSkipped(PathBuf),
    /// Releasing an archive failed.
    ReleaseFailed(PathBuf),
    /// A job ended.
    JobFinished {
        /// The job's archive.
        archive: PathBuf,
        /// Whether the job failed.
        failed: bool,
    },
}

/// Diagnostics sink that records every event for later assertions.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Counts the recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&DiagnosticEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    fn push(&self, event: DiagnosticEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn job_started(&self, job: &ExtractionJob) {
        self.push(DiagnosticEvent::JobStarted(job.source_archive().to_path_buf()));
    }

    fn destination_cleaned(&self, destination: &Path, _elapsed: Duration) {
        self.push(DiagnosticEvent::DestinationCleaned(destination.to_path_buf()));
    }

    fn directory_created(&self, path: &Path) {
        self.push(DiagnosticEvent::DirectoryCreated(path.to_path_buf()));
    }

    fn file_copied(&self, path: &Path, bytes: u64) {
        self.push(DiagnosticEvent::FileCopied(path.to_path_buf(), bytes));
    }

    fn file_skipped(&self, path: &Path) {
        self.push(DiagnosticEvent::FileSkipped(path.to_path_buf()));
    }

    fn release_failed(&self, archive: &Path, _error: &io::Error) {
        self.push(DiagnosticEvent::ReleaseFailed(archive.to_path_buf()));
    }

    fn job_finished(&self, job: &ExtractionJob, _elapsed: Duration, error: Option<&ExtractError>) {
        self.push(DiagnosticEvent::JobFinished {
            archive: job.source_archive().to_path_buf(),
            failed: error.is_some(),
        });
    }
}

/// Archive reader whose handles fail to close.
#[derive(Debug, Default)]
pub struct CloseFailingReader;

struct CloseFailingContents(Box<dyn EntryReader>);

impl ArchiveReader for CloseFailingReader {
    fn open(&self, path: &Path) -> Result<OpenArchive, ArchiveError> {
        let OpenArchive { roots, contents } = FormatReader.open(path)?;
        Ok(OpenArchive::new(roots, Box::new(CloseFailingContents(contents))))
    }
}

impl EntryReader for CloseFailingContents {
    fn open_file(&mut self, file: &VirtualFile) -> io::Result<Box<dyn Read + '_>> {
        self.0.open_file(file)
    }

    fn close(&mut self) -> io::Result<()> {
        self.0.close()?;
        Err(io::Error::other("simulated release failure"))
    }
}

/// Snapshot of a directory tree: relative path to file contents, `None`
/// for directories.
#[must_use]
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            let contents = if entry.file_type().is_dir() {
                None
            } else {
                Some(std::fs::read(entry.path()).unwrap())
            };
            (relative, contents)
        })
        .collect()
}

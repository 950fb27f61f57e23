//! Recursive copy of a virtual directory tree to disk.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use crate::Diagnostics;
use crate::ExtractError;
use crate::OverwritePolicy;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::formats::EntryReader;
use crate::formats::VirtualDir;
use crate::formats::VirtualEntry;
use crate::formats::VirtualFile;
use crate::report::JobReport;

/// Copies the trees of one opened archive into a destination directory.
///
/// A copier belongs to a single job. Entries are written in archive order
/// and every directory is created before anything inside it.
pub struct TreeCopier<'a> {
    contents: &'a mut dyn EntryReader,
    policy: OverwritePolicy,
    diagnostics: &'a dyn Diagnostics,
    buffer: CopyBuffer,
}

impl<'a> TreeCopier<'a> {
    /// Creates a copier reading file data from `contents`.
    pub fn new(
        contents: &'a mut dyn EntryReader,
        policy: OverwritePolicy,
        diagnostics: &'a dyn Diagnostics,
    ) -> Self {
        Self {
            contents,
            policy,
            diagnostics,
            buffer: CopyBuffer::new(),
        }
    }

    /// Copies every entry of `source_dir` into `destination_dir`,
    /// recursing into subdirectories, and adds the counts to `report`.
    ///
    /// `destination_dir` must already exist.
    ///
    /// # Errors
    ///
    /// Stops at the first entry that cannot be written:
    /// - [`ExtractError::DirectoryCreateFailed`]
    /// - [`ExtractError::FileCopyFailed`]
    pub fn copy(
        &mut self,
        source_dir: &VirtualDir,
        destination_dir: &Path,
        report: &mut JobReport,
    ) -> Result<()> {
        for entry in &source_dir.entries {
            let destination_path = destination_dir.join(entry.name());
            match entry {
                VirtualEntry::Directory(dir) => {
                    if create_directory(&destination_path)? {
                        report.directories_created += 1;
                        self.diagnostics.directory_created(&destination_path);
                    }
                    self.copy(dir, &destination_path, report)?;
                }
                VirtualEntry::File(file) => {
                    self.copy_file(file, &destination_path, report)?;
                }
            }
        }
        Ok(())
    }

    fn copy_file(
        &mut self,
        file: &VirtualFile,
        destination_path: &Path,
        report: &mut JobReport,
    ) -> Result<()> {
        let copy_failed = |source: io::Error| ExtractError::FileCopyFailed {
            path: destination_path.to_path_buf(),
            source,
        };

        let output = match self.policy {
            OverwritePolicy::Replace => open_replacing(destination_path).map_err(copy_failed)?,
            OverwritePolicy::Skip => {
                let Some(output) = open_if_absent(destination_path).map_err(copy_failed)? else {
                    report.files_skipped += 1;
                    self.diagnostics.file_skipped(destination_path);
                    return Ok(());
                };
                output
            }
        };

        let bytes = self
            .write_contents(file, output)
            .map_err(copy_failed)?;
        report.files_copied += 1;
        report.bytes_written = report.bytes_written.saturating_add(bytes);
        self.diagnostics.file_copied(destination_path, bytes);
        Ok(())
    }

    fn write_contents(&mut self, file: &VirtualFile, output: File) -> io::Result<u64> {
        let mut writer = BufWriter::new(output);
        let bytes = {
            let mut reader = self.contents.open_file(file)?;
            copy_with_buffer(&mut reader, &mut writer, &mut self.buffer)?
        };
        let output = writer.into_inner().map_err(io::IntoInnerError::into_error)?;

        if let Some(modified) = file.modified {
            output.set_modified(modified)?;
        }
        #[cfg(unix)]
        if let Some(mode) = file.mode {
            use std::os::unix::fs::PermissionsExt;
            output.set_permissions(fs::Permissions::from_mode(mode & 0o7777))?;
        }
        Ok(bytes)
    }
}

/// Creates `path` as a directory, tolerating an existing one.
///
/// Returns whether the directory was newly created.
fn create_directory(path: &Path) -> Result<bool> {
    match fs::create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(false),
        Err(source) => Err(ExtractError::DirectoryCreateFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Creates `path` as a new file, unlinking whatever non-directory entry
/// was there.
///
/// The old file is never opened, so its permissions do not matter and hard
/// links or symlink targets keep their contents. A directory in the way is
/// left alone and fails the open. A file recreated by a concurrent job
/// between the unlink and the open is replaced once more.
fn open_replacing(path: &Path) -> io::Result<File> {
    let mut retried = false;
    loop {
        if fs::symlink_metadata(path).is_ok_and(|meta| !meta.is_dir()) {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && !retried && !path.is_dir() => {
                retried = true;
            }
            result => return result,
        }
    }
}

/// Creates `path` only if nothing exists there yet, symlinks included.
///
/// Returns `None` when the path is taken.
fn open_if_absent(path: &Path) -> io::Result<Option<File>> {
    if fs::symlink_metadata(path).is_ok() {
        return Ok(None);
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(e),
    }
}

impl std::fmt::Debug for TreeCopier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeCopier")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::NoopDiagnostics;
    use crate::formats::ArchiveReader;
    use crate::formats::FormatReader;
    use crate::formats::OpenArchive;
    use crate::test_utils::DiagnosticEvent;
    use crate::test_utils::RecordingDiagnostics;
    use crate::test_utils::TarTestBuilder;
    use crate::test_utils::create_test_zip;
    use std::time::Duration;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn open(temp: &TempDir, name: &str, bytes: Vec<u8>) -> OpenArchive {
        let path = temp.path().join(name);
        fs::write(&path, bytes).unwrap();
        FormatReader.open(&path).unwrap()
    }

    fn copy_all(
        archive: &mut OpenArchive,
        destination: &Path,
        policy: OverwritePolicy,
        diagnostics: &dyn Diagnostics,
    ) -> Result<JobReport> {
        let mut report = JobReport::default();
        let mut copier = TreeCopier::new(archive.contents.as_mut(), policy, diagnostics);
        for root in &archive.roots {
            copier.copy(root, destination, &mut report)?;
        }
        Ok(report)
    }

    #[test]
    fn test_copy_nested_tree() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(
            &temp,
            "a.zip",
            create_test_zip(&[("a/b.txt", "hello"), ("a/c/d.txt", "deep"), ("top.txt", "top")]),
        );
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        let report = copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics)
            .unwrap();

        assert_eq!(fs::read_to_string(dest.join("a/b.txt")).unwrap(), "hello");
        assert_eq!(fs::read_to_string(dest.join("a/c/d.txt")).unwrap(), "deep");
        assert_eq!(fs::read_to_string(dest.join("top.txt")).unwrap(), "top");
        assert_eq!(report.files_copied, 3);
        assert_eq!(report.directories_created, 2);
        assert_eq!(report.bytes_written, 12);
    }

    #[test]
    fn test_replace_overwrites_longer_existing_file() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(&temp, "a.zip", create_test_zip(&[("f.txt", "new")]));
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("f.txt"), "much longer old contents").unwrap();

        copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics).unwrap();

        assert_eq!(fs::read_to_string(dest.join("f.txt")).unwrap(), "new");
    }

    #[test]
    fn test_skip_keeps_existing_file() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(
            &temp,
            "a.zip",
            create_test_zip(&[("f.txt", "new"), ("g.txt", "fresh")]),
        );
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("f.txt"), "old").unwrap();
        let diagnostics = RecordingDiagnostics::new();

        let report = copy_all(&mut archive, &dest, OverwritePolicy::Skip, &diagnostics).unwrap();

        assert_eq!(fs::read_to_string(dest.join("f.txt")).unwrap(), "old");
        assert_eq!(fs::read_to_string(dest.join("g.txt")).unwrap(), "fresh");
        assert_eq!(report.files_copied, 1);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(
            diagnostics.count(|e| matches!(e, DiagnosticEvent::FileSkipped(_))),
            1
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_skip_treats_dangling_symlink_as_existing() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(&temp, "a.zip", create_test_zip(&[("f.txt", "new")]));
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), dest.join("f.txt")).unwrap();

        let report =
            copy_all(&mut archive, &dest, OverwritePolicy::Skip, &NoopDiagnostics).unwrap();

        assert_eq!(report.files_skipped, 1);
        assert!(!temp.path().join("nowhere").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_does_not_write_through_symlink() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(&temp, "a.zip", create_test_zip(&[("f.txt", "new")]));
        let target = temp.path().join("target.txt");
        fs::write(&target, "untouched").unwrap();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        std::os::unix::fs::symlink(&target, dest.join("f.txt")).unwrap();

        copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "untouched");
        assert_eq!(fs::read_to_string(dest.join("f.txt")).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_creates_new_file_over_read_only_one() {
        use std::os::unix::fs::MetadataExt;
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tar = TarTestBuilder::new()
            .add_file_with_mode("ro.txt", b"v1", 0o444)
            .build();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        let mut archive = open(&temp, "a.tar", tar.clone());
        copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics).unwrap();
        let first = dest.join("ro.txt");
        assert_eq!(fs::metadata(&first).unwrap().permissions().mode() & 0o777, 0o444);

        // The link keeps the first inode alive, so inode numbers cannot be reused.
        let link = temp.path().join("link.txt");
        fs::hard_link(&first, &link).unwrap();
        let old_inode = fs::metadata(&link).unwrap().ino();

        let mut archive = open(&temp, "a.tar", tar);
        let report =
            copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics).unwrap();

        assert_eq!(report.files_copied, 1);
        assert_eq!(fs::read_to_string(&first).unwrap(), "v1");
        assert_ne!(fs::metadata(&first).unwrap().ino(), old_inode);
        assert_eq!(fs::metadata(&first).unwrap().permissions().mode() & 0o777, 0o444);
        assert_eq!(fs::metadata(&link).unwrap().nlink(), 1);
    }

    #[test]
    fn test_replace_leaves_hard_linked_copy_alone() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(&temp, "a.zip", create_test_zip(&[("f.txt", "new")]));
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        let outside = temp.path().join("outside.txt");
        fs::write(&outside, "shared").unwrap();
        fs::hard_link(&outside, dest.join("f.txt")).unwrap();

        copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics).unwrap();

        assert_eq!(fs::read_to_string(&outside).unwrap(), "shared");
        assert_eq!(fs::read_to_string(dest.join("f.txt")).unwrap(), "new");
    }

    #[test]
    fn test_existing_directory_is_reused() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(&temp, "a.zip", create_test_zip(&[("a/b.txt", "hello")]));
        let dest = temp.path().join("out");
        fs::create_dir_all(dest.join("a")).unwrap();
        fs::write(dest.join("a/other.txt"), "other").unwrap();

        let report = copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics)
            .unwrap();

        assert_eq!(report.directories_created, 0);
        assert!(dest.join("a/other.txt").exists());
        assert!(dest.join("a/b.txt").exists());
    }

    #[test]
    fn test_file_in_place_of_directory_fails() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(&temp, "a.zip", create_test_zip(&[("a/b.txt", "hello")]));
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("a"), "blocking file").unwrap();

        let err = copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics)
            .unwrap_err();

        assert!(
            matches!(err, ExtractError::DirectoryCreateFailed { ref path, .. } if path == &dest.join("a"))
        );
    }

    #[test]
    fn test_directory_in_place_of_file_fails() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(&temp, "a.zip", create_test_zip(&[("f.txt", "x")]));
        let dest = temp.path().join("out");
        fs::create_dir_all(dest.join("f.txt")).unwrap();

        let err = copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics)
            .unwrap_err();

        assert!(
            matches!(err, ExtractError::FileCopyFailed { ref path, .. } if path == &dest.join("f.txt"))
        );
    }

    #[test]
    fn test_metadata_propagation() {
        let temp = TempDir::new().unwrap();
        let mut archive = open(
            &temp,
            "a.tar",
            TarTestBuilder::new()
                .add_file_with_mode("run.sh", b"#!/bin/sh\n", 0o750)
                .build(),
        );
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();

        copy_all(&mut archive, &dest, OverwritePolicy::Replace, &NoopDiagnostics).unwrap();

        let meta = fs::metadata(dest.join("run.sh")).unwrap();
        let expected = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        assert_eq!(meta.modified().unwrap(), expected);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            assert_eq!(meta.permissions().mode() & 0o777, 0o750);
        }
    }
}

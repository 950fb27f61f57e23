//! Traits at the seam between the extraction engine and archive formats.

use std::io;
use std::io::Read;
use std::path::Path;

use crate::error::ArchiveError;
use crate::formats::vfs::VirtualDir;
use crate::formats::vfs::VirtualFile;

/// Opens archives as browsable trees.
///
/// Shared by every job of a run, so implementations must be thread-safe.
/// Each call to [`ArchiveReader::open`] returns an independent handle that
/// the calling job owns exclusively.
pub trait ArchiveReader: Send + Sync {
    /// Opens the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, its format is not
    /// recognized, or its entry listing is corrupt or unsafe.
    fn open(&self, path: &Path) -> Result<OpenArchive, ArchiveError>;
}

/// Streams file contents out of an opened archive.
pub trait EntryReader {
    /// Returns a reader over the contents of `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be located or decoded, or if the
    /// reader has already been closed.
    fn open_file(&mut self, file: &VirtualFile) -> io::Result<Box<dyn Read + '_>>;

    /// Releases the underlying archive resources.
    ///
    /// Calling `close` more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the resources failed. The data already
    /// read from the archive is not affected.
    fn close(&mut self) -> io::Result<()>;
}

/// An opened archive: its directory roots plus the reader for file data.
pub struct OpenArchive {
    /// Root directories exposed by the archive.
    pub roots: Vec<VirtualDir>,
    /// Source of file contents.
    pub contents: Box<dyn EntryReader>,
}

impl OpenArchive {
    /// Bundles roots and contents.
    #[must_use]
    pub fn new(roots: Vec<VirtualDir>, contents: Box<dyn EntryReader>) -> Self {
        Self { roots, contents }
    }
}

impl std::fmt::Debug for OpenArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenArchive")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

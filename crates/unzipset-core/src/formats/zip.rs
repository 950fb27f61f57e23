//! ZIP archive reader.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use crate::error::ArchiveError;
use crate::formats::traits::EntryReader;
use crate::formats::traits::OpenArchive;
use crate::formats::vfs::FileMeta;
use crate::formats::vfs::TreeBuilder;
use crate::formats::vfs::VirtualFile;

type ZipFileArchive = zip::ZipArchive<BufReader<File>>;

/// Opens a ZIP (or JAR) archive.
///
/// The central directory is listed once; file data is decompressed lazily
/// as the copier asks for each entry. Symlink entries are left out of the
/// tree.
pub fn open_zip(path: &Path) -> Result<OpenArchive, ArchiveError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| ArchiveError::InvalidArchive(format!("failed to open ZIP archive: {e}")))?;

    let mut builder = TreeBuilder::new();
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(|e| {
            ArchiveError::InvalidArchive(format!("failed to read ZIP entry {index}: {e}"))
        })?;

        if entry.is_symlink() {
            continue;
        }
        if entry.is_dir() {
            builder.add_directory(entry.name())?;
            continue;
        }

        let meta = FileMeta {
            locator: index as u64,
            size: entry.size(),
            modified: entry.last_modified().and_then(dos_time_to_system),
            mode: entry.unix_mode(),
        };
        builder.add_file(entry.name(), meta)?;
    }

    Ok(OpenArchive::new(
        vec![builder.build()],
        Box::new(ZipContents {
            archive: Some(archive),
        }),
    ))
}

struct ZipContents {
    archive: Option<ZipFileArchive>,
}

impl EntryReader for ZipContents {
    fn open_file(&mut self, file: &VirtualFile) -> io::Result<Box<dyn Read + '_>> {
        let archive = self
            .archive
            .as_mut()
            .ok_or_else(|| io::Error::other("ZIP archive already closed"))?;
        let index = usize::try_from(file.locator).map_err(io::Error::other)?;
        let entry = archive.by_index(index).map_err(io::Error::other)?;
        Ok(Box::new(entry))
    }

    fn close(&mut self) -> io::Result<()> {
        self.archive = None;
        Ok(())
    }
}

/// Converts a DOS timestamp to `SystemTime`, reading it as UTC.
#[allow(deprecated)]
fn dos_time_to_system(time: zip::DateTime) -> Option<SystemTime> {
    time.to_time().ok().map(SystemTime::from)
}

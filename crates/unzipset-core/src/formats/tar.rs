//! Tar archive reader, plain or compressed.
//!
//! Tar is a sequential format, so browsing it as a tree needs random access
//! to member data. Plain tar files are read in place. Compressed ones are
//! first decoded into an anonymous temporary file which lives exactly as
//! long as the returned [`EntryReader`]. Each file's locator is the offset of
//! its data within the (decoded) tar stream.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;
use zstd::stream::read::Decoder as ZstdDecoder;

use crate::error::ArchiveError;
use crate::formats::detect::ArchiveType;
use crate::formats::traits::EntryReader;
use crate::formats::traits::OpenArchive;
use crate::formats::vfs::FileMeta;
use crate::formats::vfs::TreeBuilder;
use crate::formats::vfs::VirtualDir;
use crate::formats::vfs::VirtualFile;

/// Opens a tar archive of the given flavour.
///
/// # Errors
///
/// Returns an error for non-tar formats, unreadable files, corrupt streams
/// and unsafe entry names. Symlinks, hardlinks and other special members
/// are skipped.
pub fn open_tar(path: &Path, format: ArchiveType) -> Result<OpenArchive, ArchiveError> {
    let file = File::open(path)?;
    let data = match format {
        ArchiveType::Tar => file,
        ArchiveType::TarGz => spool(GzDecoder::new(BufReader::new(file)))?,
        ArchiveType::TarBz2 => spool(BzDecoder::new(BufReader::new(file)))?,
        ArchiveType::TarXz => spool(XzDecoder::new(BufReader::new(file)))?,
        ArchiveType::TarZst => spool(ZstdDecoder::new(BufReader::new(file))?)?,
        ArchiveType::Zip => return Err(ArchiveError::UnsupportedFormat),
    };

    let root = list_entries(&data)?;
    Ok(OpenArchive::new(
        vec![root],
        Box::new(TarContents { data: Some(data) }),
    ))
}

/// Decodes a compressed stream into an anonymous temporary file.
fn spool<R: Read>(mut decoder: R) -> Result<File, ArchiveError> {
    let mut spooled = tempfile::tempfile()?;
    io::copy(&mut decoder, &mut spooled).map_err(|e| {
        ArchiveError::InvalidArchive(format!("failed to decompress tar stream: {e}"))
    })?;
    spooled.rewind()?;
    Ok(spooled)
}

fn list_entries(mut data: &File) -> Result<VirtualDir, ArchiveError> {
    data.rewind()?;
    let mut archive = tar::Archive::new(data);
    let entries = archive
        .entries()
        .map_err(|e| ArchiveError::InvalidArchive(format!("failed to read TAR entries: {e}")))?;

    let mut builder = TreeBuilder::new();
    for entry_result in entries {
        let entry = entry_result
            .map_err(|e| ArchiveError::InvalidArchive(format!("failed to read TAR entry: {e}")))?;
        let path = entry
            .path()
            .map_err(|e| ArchiveError::InvalidArchive(format!("invalid path: {e}")))?;
        let name = path.to_string_lossy().into_owned();

        let kind = entry.header().entry_type();
        if kind.is_dir() {
            builder.add_directory(&name)?;
        } else if kind.is_file() {
            let meta = FileMeta {
                locator: entry.raw_file_position(),
                size: entry.size(),
                modified: entry
                    .header()
                    .mtime()
                    .ok()
                    .and_then(|t| SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(t))),
                mode: entry.header().mode().ok(),
            };
            builder.add_file(&name, meta)?;
        }
    }

    Ok(builder.build())
}

struct TarContents {
    data: Option<File>,
}

impl EntryReader for TarContents {
    fn open_file(&mut self, file: &VirtualFile) -> io::Result<Box<dyn Read + '_>> {
        let data = self
            .data
            .as_mut()
            .ok_or_else(|| io::Error::other("tar archive already closed"))?;
        data.seek(SeekFrom::Start(file.locator))?;
        Ok(Box::new(BufReader::new(data.take(file.size))))
    }

    fn close(&mut self) -> io::Result<()> {
        self.data = None;
        Ok(())
    }
}

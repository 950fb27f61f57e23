//! Archive format detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ArchiveError;

/// ZIP local file header signature, also found at the start of JARs.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// Signature of an empty ZIP (end of central directory only).
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5A, 0x68];
const XZ_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
/// `ustar` marker at offset 257 of a tar header block.
const TAR_MAGIC: &[u8; 5] = b"ustar";
const TAR_MAGIC_OFFSET: usize = 257;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    /// Tar archive (uncompressed).
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
    /// Bzip2-compressed tar archive.
    TarBz2,
    /// XZ-compressed tar archive.
    TarXz,
    /// Zstd-compressed tar archive.
    TarZst,
    /// ZIP archive, including Java archives.
    Zip,
}

/// Detects the archive type of a file.
///
/// The extension decides when it is known; otherwise the leading bytes of
/// the file are inspected.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedFormat`] if neither the extension nor
/// the content identify a supported format, or an I/O error if the file
/// cannot be read for sniffing.
pub fn detect_format(path: &Path) -> Result<ArchiveType, ArchiveError> {
    if let Some(format) = detect_from_extension(path) {
        return Ok(format);
    }
    detect_from_content(path)
}

/// Detects the archive type from the file name alone.
#[must_use]
pub fn detect_from_extension(path: &Path) -> Option<ArchiveType> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "zip" | "jar" | "war" | "ear" => Some(ArchiveType::Zip),
        "tar" => Some(ArchiveType::Tar),
        "tgz" => Some(ArchiveType::TarGz),
        "tbz" | "tbz2" => Some(ArchiveType::TarBz2),
        "txz" => Some(ArchiveType::TarXz),
        "tzst" => Some(ArchiveType::TarZst),
        "gz" | "bz2" | "xz" | "zst" if has_tar_stem(path) => match extension.as_str() {
            "gz" => Some(ArchiveType::TarGz),
            "bz2" => Some(ArchiveType::TarBz2),
            "xz" => Some(ArchiveType::TarXz),
            _ => Some(ArchiveType::TarZst),
        },
        _ => None,
    }
}

fn has_tar_stem(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| Path::new(stem).extension())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tar"))
}

fn detect_from_content(path: &Path) -> Result<ArchiveType, ArchiveError> {
    let mut header = [0u8; TAR_MAGIC_OFFSET + TAR_MAGIC.len()];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    sniff(&header[..filled]).ok_or(ArchiveError::UnsupportedFormat)
}

fn sniff(bytes: &[u8]) -> Option<ArchiveType> {
    if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&ZIP_EMPTY_MAGIC) {
        Some(ArchiveType::Zip)
    } else if bytes.starts_with(&GZIP_MAGIC) {
        Some(ArchiveType::TarGz)
    } else if bytes.starts_with(&BZIP2_MAGIC) {
        Some(ArchiveType::TarBz2)
    } else if bytes.starts_with(&XZ_MAGIC) {
        Some(ArchiveType::TarXz)
    } else if bytes.starts_with(&ZSTD_MAGIC) {
        Some(ArchiveType::TarZst)
    } else if bytes.get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len()) == Some(&TAR_MAGIC[..])
    {
        Some(ArchiveType::Tar)
    } else {
        None
    }
}

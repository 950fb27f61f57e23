//! Archive readers.

pub mod detect;
pub mod tar;
pub mod traits;
pub mod vfs;
pub mod zip;

use std::path::Path;

use crate::error::ArchiveError;

// Re-export main types for convenience
pub use detect::ArchiveType;
pub use traits::ArchiveReader;
pub use traits::EntryReader;
pub use traits::OpenArchive;
pub use vfs::VirtualDir;
pub use vfs::VirtualEntry;
pub use vfs::VirtualFile;

/// Reader for every built-in format, chosen per archive by
/// [`detect::detect_format`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatReader;

impl ArchiveReader for FormatReader {
    fn open(&self, path: &Path) -> Result<OpenArchive, ArchiveError> {
        match detect::detect_format(path)? {
            ArchiveType::Zip => zip::open_zip(path),
            format => tar::open_tar(path, format),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_tar;
    use crate::test_utils::create_test_zip;
    use tempfile::TempDir;

    #[test]
    fn test_format_reader_dispatch() {
        let temp = TempDir::new().unwrap();
        let zip_path = temp.path().join("a.jar");
        std::fs::write(&zip_path, create_test_zip(&[("META-INF/MANIFEST.MF", "v")])).unwrap();
        let tar_path = temp.path().join("a.tar");
        std::fs::write(&tar_path, create_test_tar(&[("x/y.txt", "y")])).unwrap();

        let zip = FormatReader.open(&zip_path).unwrap();
        assert_eq!(zip.roots[0].file_count(), 1);
        let tar = FormatReader.open(&tar_path).unwrap();
        assert_eq!(tar.roots[0].file_count(), 1);
    }

    #[test]
    fn test_format_reader_unsupported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        std::fs::write(&path, b"plain text").unwrap();
        assert!(matches!(
            FormatReader.open(&path),
            Err(ArchiveError::UnsupportedFormat)
        ));
    }
}

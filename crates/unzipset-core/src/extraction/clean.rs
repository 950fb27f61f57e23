//! Emptying destination directories.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Removes every entry directly inside `directory`, leaving the directory
/// itself in place.
///
/// Symbolic links are removed, never followed, so a link to a directory
/// outside the destination does not lose its target's contents.
///
/// # Errors
///
/// Returns the first I/O error; entries removed before it stay removed.
pub fn clean_directory(directory: &Path) -> io::Result<()> {
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

//! Virtual directory trees exposed by archive readers.
//!
//! A reader lists every entry of an archive up front and arranges them into
//! [`VirtualDir`] trees. File contents are not read at this point; a
//! [`VirtualFile`] only carries a format-specific locator that the reader
//! uses later to stream the bytes.

use std::collections::HashMap;
use std::path::Component;
use std::path::Path;
use std::time::SystemTime;

use crate::error::ArchiveError;

/// A directory inside an archive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualDir {
    /// Directory name. Empty for a root.
    pub name: String,
    /// Child entries in the order the archive first exposes them.
    pub entries: Vec<VirtualEntry>,
}

/// A child of a [`VirtualDir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualEntry {
    /// A nested directory.
    Directory(VirtualDir),
    /// A regular file.
    File(VirtualFile),
}

impl VirtualEntry {
    /// Name of the entry within its parent.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Directory(dir) => &dir.name,
            Self::File(file) => &file.name,
        }
    }
}

/// A regular file inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    /// File name within its parent directory.
    pub name: String,
    /// Reader-specific position of the file's data.
    pub locator: u64,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Stored modification time, if any.
    pub modified: Option<SystemTime>,
    /// Stored Unix permission bits, if any.
    pub mode: Option<u32>,
}

impl VirtualDir {
    /// Number of files in this directory and all of its descendants.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                VirtualEntry::Directory(dir) => dir.file_count(),
                VirtualEntry::File(_) => 1,
            })
            .sum()
    }
}

/// Metadata a reader attaches to a file when inserting it into a tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMeta {
    /// Reader-specific position of the file's data.
    pub locator: u64,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Stored modification time.
    pub modified: Option<SystemTime>,
    /// Stored Unix permission bits.
    pub mode: Option<u32>,
}

/// Incrementally arranges flat archive entry names into a tree.
///
/// Parent directories that the archive never lists explicitly are
/// synthesized at the position of the first entry that needs them. A later
/// file entry with the same name replaces the earlier one, which matches how
/// tar appends newer versions of a member.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    root: DirNode,
}

#[derive(Debug, Default)]
struct DirNode {
    name: String,
    children: Vec<NodeEntry>,
    index: HashMap<String, usize>,
}

#[derive(Debug)]
enum NodeEntry {
    Dir(DirNode),
    File(VirtualFile),
}

impl TreeBuilder {
    /// Creates an empty builder with a single unnamed root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a directory entry and any missing parents.
    pub fn add_directory(&mut self, name: &str) -> Result<(), ArchiveError> {
        let components = split_entry_name(name)?;
        self.root.directory_at(&components, name)?;
        Ok(())
    }

    /// Records a file entry, creating missing parent directories.
    pub fn add_file(&mut self, name: &str, meta: FileMeta) -> Result<(), ArchiveError> {
        let mut components = split_entry_name(name)?;
        let Some(file_name) = components.pop() else {
            return Err(ArchiveError::InvalidArchive(format!(
                "file entry without a name: {name:?}"
            )));
        };

        let parent = self.root.directory_at(&components, name)?;
        let file = VirtualFile {
            name: file_name.clone(),
            locator: meta.locator,
            size: meta.size,
            modified: meta.modified,
            mode: meta.mode,
        };

        let existing = parent.index.get(&file_name).copied();
        match existing {
            Some(slot) => match &mut parent.children[slot] {
                NodeEntry::File(existing) => *existing = file,
                NodeEntry::Dir(_) => {
                    return Err(ArchiveError::InvalidArchive(format!(
                        "entry {name:?} is both a file and a directory"
                    )));
                }
            },
            None => {
                parent.index.insert(file_name, parent.children.len());
                parent.children.push(NodeEntry::File(file));
            }
        }
        Ok(())
    }

    /// Finishes the tree.
    #[must_use]
    pub fn build(self) -> VirtualDir {
        self.root.into_virtual()
    }
}

impl DirNode {
    fn directory_at(&mut self, components: &[String], entry: &str) -> Result<&mut Self, ArchiveError> {
        let Some((first, rest)) = components.split_first() else {
            return Ok(self);
        };

        let slot = if let Some(&slot) = self.index.get(first) {
            slot
        } else {
            self.index.insert(first.clone(), self.children.len());
            self.children.push(NodeEntry::Dir(Self {
                name: first.clone(),
                ..Self::default()
            }));
            self.children.len() - 1
        };

        match &mut self.children[slot] {
            NodeEntry::Dir(dir) => dir.directory_at(rest, entry),
            NodeEntry::File(_) => Err(ArchiveError::InvalidArchive(format!(
                "entry {entry:?} is both a file and a directory"
            ))),
        }
    }

    fn into_virtual(self) -> VirtualDir {
        VirtualDir {
            name: self.name,
            entries: self
                .children
                .into_iter()
                .map(|child| match child {
                    NodeEntry::Dir(dir) => VirtualEntry::Directory(dir.into_virtual()),
                    NodeEntry::File(file) => VirtualEntry::File(file),
                })
                .collect(),
        }
    }
}

/// Splits an archive entry name into plain path components.
///
/// `.` components are dropped. Parent, root and prefix components are
/// rejected because they would place the entry outside the archive root.
fn split_entry_name(name: &str) -> Result<Vec<String>, ArchiveError> {
    let normalized = name.replace('\\', "/");
    Path::new(&normalized)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .map(|component| match component {
            Component::Normal(part) => Ok(part.to_string_lossy().into_owned()),
            _ => Err(ArchiveError::UnsafeEntryName {
                name: name.to_string(),
            }),
        })
        .collect()
}

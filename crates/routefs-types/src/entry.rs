//! Directory entry and metadata types for filesystem operations.

use std::time::SystemTime;

/// Kind of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryKind {
    File,
    Directory,
}

/// A directory entry returned by `list`.
///
/// Entries carry their full scheme-qualified path, not a bare name, because
/// the router translates listing results back from physical to logical
/// prefixes before returning them.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Full scheme-qualified path of the entry.
    pub path: String,
    /// Kind of entry.
    pub kind: DirEntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time, if available.
    pub modified: Option<SystemTime>,
}

impl DirEntry {
    /// Create a new file entry.
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: DirEntryKind::File,
            size,
            modified: None,
        }
    }

    /// Create a new directory entry.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: DirEntryKind::Directory,
            size: 0,
            modified: None,
        }
    }

    /// Set the modification time.
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// The last path segment (file or directory name).
    pub fn name(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }

    /// Returns true if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == DirEntryKind::Directory
    }

    /// Returns true if this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == DirEntryKind::File
    }
}

/// Metadata about a file or directory.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// True if this is a directory.
    pub is_dir: bool,
    /// True if this is a file.
    pub is_file: bool,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modification time, if available.
    pub modified: Option<SystemTime>,
}

impl Metadata {
    /// Metadata for a directory.
    pub fn directory() -> Self {
        Self {
            is_dir: true,
            is_file: false,
            size: 0,
            modified: None,
        }
    }

    /// Metadata for a file of the given size.
    pub fn file(size: u64) -> Self {
        Self {
            is_dir: false,
            is_file: true,
            size,
            modified: None,
        }
    }
}

//! In-memory filesystem implementation.
//!
//! Used for scratch data and testing. All data is ephemeral.

use super::{ByteReader, ByteWriter, Filesystem};
use async_trait::async_trait;
use routefs_types::{DirEntry, Metadata, WriteMode};
use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};
use std::time::SystemTime;
use tokio::io::AsyncWrite;

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File { data: Vec<u8>, modified: SystemTime },
    Directory { modified: SystemTime },
}

type EntryMap = Arc<RwLock<HashMap<String, Entry>>>;

/// In-memory filesystem.
///
/// Thread-safe via internal `RwLock`; open writers hold a shared handle to
/// the entry map so data written through the router lands here on close.
/// All data is lost when the last handle is dropped.
#[derive(Debug, Clone)]
pub struct MemoryFs {
    entries: EntryMap,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    /// Create a new empty in-memory filesystem.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Root directory always exists
        entries.insert(
            String::new(),
            Entry::Directory {
                modified: SystemTime::now(),
            },
        );
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Read the entire contents of a file. Test convenience.
    pub fn contents(&self, path: &str) -> io::Result<Vec<u8>> {
        let key = Self::key(path);
        let entries = lock_read(&self.entries)?;
        match entries.get(&key) {
            Some(Entry::File { data, .. }) => Ok(data.clone()),
            Some(Entry::Directory { .. }) => Err(is_a_directory(path)),
            None => Err(not_found(path)),
        }
    }

    /// Store a file directly. Test convenience.
    pub fn put(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let key = Self::key(path);
        self.ensure_parents(&key)?;
        let mut entries = lock_write(&self.entries)?;
        if let Some(Entry::Directory { .. }) = entries.get(&key) {
            return Err(is_a_directory(path));
        }
        entries.insert(
            key,
            Entry::File {
                data: data.to_vec(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    /// Normalize a path to its storage key: strip the scheme, resolve `.`
    /// and `..`, collapse empty segments.
    fn key(path: &str) -> String {
        let rest = match path.split_once("://") {
            Some((_, rest)) => rest,
            None => path,
        };
        let mut segments: Vec<&str> = Vec::new();
        for segment in rest.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        segments.join("/")
    }

    /// Scheme portion of a path including the separator, or empty.
    fn scheme_prefix(path: &str) -> &str {
        match path.find("://") {
            Some(idx) => &path[..idx + 3],
            None => "",
        }
    }

    /// Ensure all parent directories of a key exist.
    fn ensure_parents(&self, key: &str) -> io::Result<()> {
        let mut entries = lock_write(&self.entries)?;
        let mut current = String::new();
        let Some((parents, _)) = key.rsplit_once('/') else {
            return Ok(());
        };
        for segment in parents.split('/') {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            entries.entry(current.clone()).or_insert(Entry::Directory {
                modified: SystemTime::now(),
            });
        }
        Ok(())
    }

    fn has_children(entries: &HashMap<String, Entry>, key: &str) -> bool {
        let prefix = format!("{}/", key);
        entries.keys().any(|k| k.starts_with(&prefix))
    }
}

#[async_trait]
impl Filesystem for MemoryFs {
    async fn open_read(&self, path: &str) -> io::Result<ByteReader> {
        let data = self.contents(path)?;
        Ok(Box::new(io::Cursor::new(data)))
    }

    async fn open_write(&self, path: &str, mode: WriteMode) -> io::Result<ByteWriter> {
        let key = Self::key(path);
        let initial = {
            let entries = lock_read(&self.entries)?;
            match (entries.get(&key), mode) {
                (Some(Entry::Directory { .. }), _) => return Err(is_a_directory(path)),
                (Some(_), WriteMode::CreateNew) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("already exists: {}", path),
                    ));
                }
                (Some(Entry::File { data, .. }), WriteMode::Append) => data.clone(),
                _ => Vec::new(),
            }
        };
        self.ensure_parents(&key)?;
        Ok(Box::new(MemoryWriter {
            key,
            buf: initial,
            entries: Arc::clone(&self.entries),
            committed: false,
        }))
    }

    async fn list(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let key = Self::key(path);
        let prefix = Self::scheme_prefix(path);
        let entries = lock_read(&self.entries)?;

        match entries.get(&key) {
            Some(Entry::Directory { .. }) => {}
            Some(Entry::File { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("not a directory: {}", path),
                ));
            }
            None => return Err(not_found(path)),
        }

        // Find all direct children
        let mut result = Vec::new();
        for (entry_key, entry) in entries.iter() {
            let parent = match entry_key.rsplit_once('/') {
                Some((parent, _)) => parent,
                None => "",
            };
            if parent != key || entry_key == &key || entry_key.is_empty() {
                continue;
            }
            let full = format!("{}{}", prefix, entry_key);
            result.push(match entry {
                Entry::File { data, modified } => {
                    DirEntry::file(full, data.len() as u64).with_modified(*modified)
                }
                Entry::Directory { modified } => {
                    DirEntry::directory(full).with_modified(*modified)
                }
            });
        }

        // Sort for consistent ordering
        result.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(result)
    }

    async fn stat(&self, path: &str) -> io::Result<Metadata> {
        let key = Self::key(path);
        let entries = lock_read(&self.entries)?;
        match entries.get(&key) {
            Some(Entry::File { data, modified }) => Ok(Metadata {
                is_dir: false,
                is_file: true,
                size: data.len() as u64,
                modified: Some(*modified),
            }),
            Some(Entry::Directory { modified }) => Ok(Metadata {
                is_dir: true,
                is_file: false,
                size: 0,
                modified: Some(*modified),
            }),
            None => Err(not_found(path)),
        }
    }

    async fn mkdir(&self, path: &str) -> io::Result<()> {
        let key = Self::key(path);
        self.ensure_parents(&key)?;
        let mut entries = lock_write(&self.entries)?;
        match entries.get(&key) {
            Some(Entry::Directory { .. }) => Ok(()), // already exists, fine
            Some(Entry::File { .. }) => Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {}", path),
            )),
            None => {
                entries.insert(
                    key,
                    Entry::Directory {
                        modified: SystemTime::now(),
                    },
                );
                Ok(())
            }
        }
    }

    async fn delete(&self, path: &str, recursive: bool) -> io::Result<bool> {
        let key = Self::key(path);
        if key.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot remove root directory",
            ));
        }

        let mut entries = lock_write(&self.entries)?;
        if !entries.contains_key(&key) {
            return Ok(false);
        }

        if let Some(Entry::Directory { .. }) = entries.get(&key) {
            if Self::has_children(&entries, &key) {
                if !recursive {
                    return Err(io::Error::new(
                        io::ErrorKind::DirectoryNotEmpty,
                        format!("directory not empty: {}", path),
                    ));
                }
                let prefix = format!("{}/", key);
                entries.retain(|k, _| !k.starts_with(&prefix));
            }
        }

        entries.remove(&key);
        Ok(true)
    }

    async fn rename(&self, from: &str, to: &str) -> io::Result<bool> {
        let from_key = Self::key(from);
        let to_key = Self::key(to);
        if from_key.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot rename root directory",
            ));
        }

        self.ensure_parents(&to_key)?;
        let mut entries = lock_write(&self.entries)?;
        let entry = entries.remove(&from_key).ok_or_else(|| not_found(from))?;

        // Move any children along with a directory.
        if matches!(entry, Entry::Directory { .. }) {
            let old_prefix = format!("{}/", from_key);
            let moved: Vec<(String, Entry)> = entries
                .iter()
                .filter(|(k, _)| k.starts_with(&old_prefix))
                .map(|(k, v)| {
                    let suffix = &k[old_prefix.len()..];
                    (format!("{}/{}", to_key, suffix), v.clone())
                })
                .collect();
            entries.retain(|k, _| !k.starts_with(&old_prefix));
            entries.extend(moved);
        }

        entries.insert(to_key, entry);
        Ok(true)
    }
}

/// Byte sink that commits into the entry map when shut down or dropped.
struct MemoryWriter {
    key: String,
    buf: Vec<u8>,
    entries: EntryMap,
    committed: bool,
}

impl MemoryWriter {
    fn commit(&mut self) -> io::Result<()> {
        if self.committed {
            return Ok(());
        }
        self.committed = true;
        let mut entries = lock_write(&self.entries)?;
        entries.insert(
            self.key.clone(),
            Entry::File {
                data: std::mem::take(&mut self.buf),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.buf.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(self.commit())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        // A writer dropped without shutdown still commits.
        let _ = self.commit();
    }
}

fn lock_read(entries: &EntryMap) -> io::Result<std::sync::RwLockReadGuard<'_, HashMap<String, Entry>>> {
    entries.read().map_err(|_| io::Error::other("lock poisoned"))
}

fn lock_write(entries: &EntryMap) -> io::Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Entry>>> {
    entries.write().map_err(|_| io::Error::other("lock poisoned"))
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {}", path))
}

fn is_a_directory(path: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::IsADirectory,
        format!("is a directory: {}", path),
    )
}

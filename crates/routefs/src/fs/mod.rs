//! Filesystem backend contract and reference backends.
//!
//! Backends implement [`Filesystem`] over scheme-qualified string paths
//! (`scheme://bucket/dir/object`). The router hands every backend the fully
//! rewritten physical path; how a backend maps that URI onto storage is its
//! own business. Two reference implementations ship with the crate:
//!
//! - **MemoryFs**: in-memory ephemeral storage (tests, scratch data)
//! - **LocalFs**: real filesystem access rooted at a directory
//!
//! Production object-store backends live outside this crate and plug in
//! through the same trait.

mod local;
mod memory;

pub use local::LocalFs;
pub use memory::MemoryFs;

use async_trait::async_trait;
use routefs_types::{DirEntry, Metadata, WriteMode};
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};

/// Boxed byte stream returned by [`Filesystem::open_read`].
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed byte sink returned by [`Filesystem::open_write`].
pub type ByteWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Abstract filesystem interface.
///
/// Implementations must be safe for concurrent use: the router invokes them
/// from arbitrary concurrent call sites without additional locking. Errors
/// are backend-native `io::Error`s; the router tags them with the backend id
/// and physical path on the way out.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Open a file for reading.
    async fn open_read(&self, path: &str) -> io::Result<ByteReader>;

    /// Open a file for writing.
    ///
    /// Returns `Err` if the filesystem is read-only.
    async fn open_write(&self, path: &str, mode: WriteMode) -> io::Result<ByteWriter>;

    /// List entries in a directory.
    ///
    /// Entry paths are full scheme-qualified paths under the queried path.
    async fn list(&self, path: &str) -> io::Result<Vec<DirEntry>>;

    /// Get metadata for a file or directory.
    async fn stat(&self, path: &str) -> io::Result<Metadata>;

    /// Create a directory (and parent directories if needed).
    ///
    /// Returns `Err` if the filesystem is read-only.
    async fn mkdir(&self, path: &str) -> io::Result<()>;

    /// Delete a file or directory.
    ///
    /// Returns `Ok(false)` if the path does not exist. A non-empty directory
    /// is only deleted when `recursive` is true.
    async fn delete(&self, path: &str, recursive: bool) -> io::Result<bool>;

    /// Rename a file or directory within this filesystem.
    ///
    /// Returns `Ok(true)` on success.
    async fn rename(&self, from: &str, to: &str) -> io::Result<bool>;

    /// Returns true if this filesystem is read-only.
    fn read_only(&self) -> bool {
        false
    }

    /// Check if a path exists.
    async fn exists(&self, path: &str) -> bool {
        self.stat(path).await.is_ok()
    }
}

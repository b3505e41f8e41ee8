//! Local filesystem backend.
//!
//! Maps scheme-qualified paths onto a root directory, with an optional
//! read-only mode. The scheme and authority of the physical path are
//! treated as directory segments under the root.

use super::{ByteReader, ByteWriter, Filesystem};
use async_trait::async_trait;
use routefs_types::{BackendOptions, DirEntry, Metadata, WriteMode};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem backend.
///
/// All operations land under `root`. For example, with `root` set to
/// `/srv/store`, the physical path `file://warehouse/out.parquet` reads
/// `/srv/store/warehouse/out.parquet`.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
    read_only: bool,
}

impl LocalFs {
    /// Create a new local filesystem rooted at the given path.
    ///
    /// The path must exist and be a directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: false,
        }
    }

    /// Create a read-only local filesystem.
    pub fn read_only(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: true,
        }
    }

    /// Create a local filesystem from opaque backend options.
    ///
    /// Recognizes `endpoint` as the root directory; everything else is
    /// ignored here, as a local store has no credentials.
    pub fn from_options(opts: &BackendOptions) -> io::Result<Self> {
        let root = opts.endpoint.as_deref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "local backend requires an endpoint")
        })?;
        Ok(Self::new(root))
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a scheme-qualified path to an absolute path within the root.
    ///
    /// Returns an error if the path escapes the root (via `..`).
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        // Strip the scheme; the rest are plain path segments.
        let rest = match path.split_once("://") {
            Some((_, rest)) => rest,
            None => path,
        };
        let rest = rest.trim_start_matches('/');
        let full = self.root.join(rest);

        // Canonicalize to resolve symlinks and `..`. For non-existent paths,
        // canonicalize the nearest existing parent and re-append.
        let canonical = if full.exists() {
            full.canonicalize()?
        } else {
            let parent = full
                .parent()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid path"))?;
            let filename = full
                .file_name()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid path"))?;
            if parent.exists() {
                parent.canonicalize()?.join(filename)
            } else {
                // Parent doesn't exist yet; operations that create it will
                // re-resolve through the same check.
                full
            }
        };

        let canonical_root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        if !canonical.starts_with(&canonical_root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "path escapes root: {} is not under {}",
                    canonical.display(),
                    canonical_root.display()
                ),
            ));
        }

        Ok(canonical)
    }

    /// Check if write operations are allowed.
    fn check_writable(&self) -> io::Result<()> {
        if self.read_only {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "filesystem is read-only",
            ))
        } else {
            Ok(())
        }
    }
}

/// Join a child name onto a scheme-qualified directory path.
fn join_uri(dir: &str, name: &str) -> String {
    if dir.ends_with("://") {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }
}

#[async_trait]
impl Filesystem for LocalFs {
    async fn open_read(&self, path: &str) -> io::Result<ByteReader> {
        let full = self.resolve(path)?;
        let file = fs::File::open(&full).await?;
        Ok(Box::new(file))
    }

    async fn open_write(&self, path: &str, mode: WriteMode) -> io::Result<ByteWriter> {
        self.check_writable()?;
        let full = self.resolve(path)?;

        // Ensure parent directory exists
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut options = fs::OpenOptions::new();
        match mode {
            WriteMode::Overwrite => options.write(true).create(true).truncate(true),
            WriteMode::CreateNew => options.write(true).create_new(true),
            WriteMode::Append => options.append(true).create(true),
        };
        let file = options.open(&full).await?;
        Ok(Box::new(file))
    }

    async fn list(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let full = self.resolve(path)?;
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&full).await?;

        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            let child = join_uri(path, &entry.file_name().to_string_lossy());
            let mut dir_entry = if meta.is_dir() {
                DirEntry::directory(child)
            } else {
                DirEntry::file(child, meta.len())
            };
            if let Ok(modified) = meta.modified() {
                dir_entry = dir_entry.with_modified(modified);
            }
            entries.push(dir_entry);
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn stat(&self, path: &str) -> io::Result<Metadata> {
        let full = self.resolve(path)?;
        let meta = fs::metadata(&full).await?;

        Ok(Metadata {
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            size: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    async fn mkdir(&self, path: &str) -> io::Result<()> {
        self.check_writable()?;
        let full = self.resolve(path)?;
        fs::create_dir_all(&full).await
    }

    async fn delete(&self, path: &str, recursive: bool) -> io::Result<bool> {
        self.check_writable()?;
        let full = self.resolve(path)?;
        let meta = match fs::metadata(&full).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err),
        };

        if meta.is_dir() {
            if recursive {
                fs::remove_dir_all(&full).await?;
            } else {
                fs::remove_dir(&full).await?;
            }
        } else {
            fs::remove_file(&full).await?;
        }
        Ok(true)
    }

    async fn rename(&self, from: &str, to: &str) -> io::Result<bool> {
        self.check_writable()?;
        let from_full = self.resolve(from)?;
        let to_full = self.resolve(to)?;
        fs::rename(&from_full, &to_full).await?;
        Ok(true)
    }

    fn read_only(&self) -> bool {
        self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn write_file(fs: &LocalFs, path: &str, data: &[u8]) {
        let mut writer = fs.open_write(path, WriteMode::Overwrite).await.unwrap();
        writer.write_all(data).await.unwrap();
        writer.shutdown().await.unwrap();
    }

    async fn read_file(fs: &LocalFs, path: &str) -> Vec<u8> {
        let mut reader = fs.open_read(path).await.unwrap();
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.unwrap();
        data
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::new(dir.path());

        write_file(&fs, "file://out/test.txt", b"hello").await;
        assert_eq!(read_file(&fs, "file://out/test.txt").await, b"hello");

        // The scheme maps under the root as plain segments.
        assert!(dir.path().join("out/test.txt").is_file());
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::read_only(dir.path());

        let result = fs.open_write("file://test.txt", WriteMode::Overwrite).await;
        assert!(result.is_err());
        assert_eq!(result.err().unwrap().kind(), io::ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_append() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::new(dir.path());

        write_file(&fs, "file://log.txt", b"one\n").await;
        let mut writer = fs.open_write("file://log.txt", WriteMode::Append).await.unwrap();
        writer.write_all(b"two\n").await.unwrap();
        writer.shutdown().await.unwrap();

        assert_eq!(read_file(&fs, "file://log.txt").await, b"one\ntwo\n");
    }

    #[tokio::test]
    async fn test_create_new_fails_on_existing() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::new(dir.path());

        write_file(&fs, "file://test.txt", b"first").await;
        let result = fs.open_write("file://test.txt", WriteMode::CreateNew).await;
        assert!(result.is_err());
        assert_eq!(result.err().unwrap().kind(), io::ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_list_keeps_scheme_form() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::new(dir.path());

        write_file(&fs, "file://data/a.txt", b"a").await;
        write_file(&fs, "file://data/b.txt", b"b").await;

        let entries = fs.list("file://data").await.unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["file://data/a.txt", "file://data/b.txt"]);
    }

    #[tokio::test]
    async fn test_escape_is_rejected() {
        let dir = TempDir::new().unwrap();
        let inner = dir.path().join("inner");
        std::fs::create_dir(&inner).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
        let fs = LocalFs::new(&inner);

        let result = fs.open_read("file://../secret.txt").await;
        assert!(result.is_err());
        assert_eq!(result.err().unwrap().kind(), io::ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::new(dir.path());

        write_file(&fs, "file://dir/file.txt", b"data").await;

        // Non-recursive delete of a non-empty directory fails.
        assert!(fs.delete("file://dir", false).await.is_err());
        assert!(fs.delete("file://dir", true).await.unwrap());
        assert!(!fs.exists("file://dir").await);

        // Deleting a missing path reports nothing was removed.
        assert!(!fs.delete("file://dir", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_rename() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFs::new(dir.path());

        write_file(&fs, "file://old.txt", b"data").await;
        assert!(fs.rename("file://old.txt", "file://new.txt").await.unwrap());
        assert_eq!(read_file(&fs, "file://new.txt").await, b"data");
        assert!(!fs.exists("file://old.txt").await);
    }

    #[tokio::test]
    async fn test_from_options() {
        let dir = TempDir::new().unwrap();
        let mut opts = BackendOptions::default();
        opts.set("endpoint", dir.path().to_string_lossy());
        let fs = LocalFs::from_options(&opts).unwrap();
        assert_eq!(fs.root(), dir.path());

        assert!(LocalFs::from_options(&BackendOptions::default()).is_err());
    }
}

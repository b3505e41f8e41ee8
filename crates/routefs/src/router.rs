//! Router filesystem facade.
//!
//! Presents a single [`Filesystem`]-like surface over multiple backends.
//! Every call resolves its logical path, looks up the selected backend, and
//! delegates with the physical path. The facade holds no mutable state
//! after construction — it is a stateless per-call dispatcher over an
//! immutable configuration.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use routefs_types::{
    ConfigError, ConfigResult, DirEntry, Metadata, ResolvedLocation, RouterError, RouterResult,
    WriteMode,
};
use tracing::{debug, trace, warn};

use crate::config::RouterConfig;
use crate::fs::{ByteReader, ByteWriter, Filesystem};
use crate::registry::BackendRegistry;
use crate::resolve::PathResolver;

/// Routing filesystem over registered backends.
///
/// Resolution errors ([`RouterError::MalformedPath`],
/// [`RouterError::Unroutable`]) propagate unchanged; backend I/O errors are
/// wrapped as [`RouterError::Backend`], tagged with the backend id and the
/// resolved physical path.
pub struct RouterFs {
    resolver: PathResolver,
    backends: BackendRegistry,
}

impl std::fmt::Debug for RouterFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterFs")
            .field("rules", &self.resolver.config().rules().len())
            .field("backends", &self.backends)
            .finish()
    }
}

impl RouterFs {
    /// Build a router over a validated configuration and a populated
    /// registry.
    ///
    /// Fails fast with a [`ConfigError`] if any rule or default references
    /// a backend that is not registered — no I/O happens before this check
    /// passes.
    pub fn new(config: RouterConfig, backends: BackendRegistry) -> ConfigResult<Self> {
        for rule in config.rules().iter() {
            if !backends.contains(&rule.backend_id) {
                return Err(ConfigError::UnknownRuleBackend {
                    scheme: rule.scheme.clone(),
                    backend: rule.backend_id.clone(),
                });
            }
        }
        for (scheme, backend_id) in config.defaults() {
            if !backends.contains(backend_id) {
                return Err(ConfigError::UnknownDefaultBackend {
                    scheme: scheme.to_string(),
                    backend: backend_id.to_string(),
                });
            }
        }
        debug!(
            rules = config.rules().len(),
            backends = backends.len(),
            "router configured"
        );
        Ok(Self {
            resolver: PathResolver::new(config),
            backends,
        })
    }

    /// The configuration this router dispatches over.
    pub fn config(&self) -> &RouterConfig {
        self.resolver.config()
    }

    /// The registered backends.
    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    /// Resolve a logical path without performing any I/O.
    pub fn resolve(&self, logical_path: &str) -> RouterResult<ResolvedLocation> {
        self.resolver.resolve(logical_path)
    }

    /// Resolve a path and fetch its backend.
    fn locate(
        &self,
        op: &'static str,
        logical_path: &str,
    ) -> RouterResult<(Arc<dyn Filesystem>, ResolvedLocation)> {
        let location = self.resolver.resolve(logical_path)?;
        let backend = self.backends.get(&location.backend_id)?;
        trace!(
            op,
            logical = logical_path,
            physical = location.physical_path,
            backend = location.backend_id,
            "dispatching"
        );
        Ok((backend, location))
    }

    fn tag(location: &ResolvedLocation, source: io::Error) -> RouterError {
        RouterError::backend(&location.backend_id, &location.physical_path, source)
    }

    /// Open a file for reading.
    pub async fn open_read(&self, path: &str) -> RouterResult<ByteReader> {
        let (backend, location) = self.locate("open_read", path)?;
        backend
            .open_read(&location.physical_path)
            .await
            .map_err(|e| Self::tag(&location, e))
    }

    /// Open a file for writing.
    pub async fn open_write(&self, path: &str, mode: WriteMode) -> RouterResult<ByteWriter> {
        let (backend, location) = self.locate("open_write", path)?;
        backend
            .open_write(&location.physical_path, mode)
            .await
            .map_err(|e| Self::tag(&location, e))
    }

    /// Check if a path exists. Resolution failures still surface as errors.
    pub async fn exists(&self, path: &str) -> RouterResult<bool> {
        let (backend, location) = self.locate("exists", path)?;
        Ok(backend.exists(&location.physical_path).await)
    }

    /// Delete a file or directory.
    pub async fn delete(&self, path: &str, recursive: bool) -> RouterResult<bool> {
        let (backend, location) = self.locate("delete", path)?;
        backend
            .delete(&location.physical_path, recursive)
            .await
            .map_err(|e| Self::tag(&location, e))
    }

    /// List a directory. Entry paths come back under the logical prefix the
    /// caller asked about, not the rewritten physical one.
    pub async fn list(&self, path: &str) -> RouterResult<Vec<DirEntry>> {
        let (backend, location) = self.locate("list", path)?;
        let entries = backend
            .list(&location.physical_path)
            .await
            .map_err(|e| Self::tag(&location, e))?;
        entries
            .into_iter()
            .map(|mut entry| {
                entry.path = PathResolver::unresolve(&location, &entry.path)?;
                Ok(entry)
            })
            .collect()
    }

    /// Get metadata for a file or directory.
    pub async fn stat(&self, path: &str) -> RouterResult<Metadata> {
        let (backend, location) = self.locate("stat", path)?;
        backend
            .stat(&location.physical_path)
            .await
            .map_err(|e| Self::tag(&location, e))
    }

    /// Create a directory and any missing parents.
    pub async fn mkdir(&self, path: &str) -> RouterResult<()> {
        let (backend, location) = self.locate("mkdir", path)?;
        backend
            .mkdir(&location.physical_path)
            .await
            .map_err(|e| Self::tag(&location, e))
    }

    /// Rename within a single backend.
    ///
    /// Source and destination resolving to different backends is not a
    /// routing error — the rename is refused with `Ok(false)`, matching the
    /// boolean protocol callers of the underlying stores expect.
    pub async fn rename(&self, from: &str, to: &str) -> RouterResult<bool> {
        let (backend, from_location) = self.locate("rename", from)?;
        let (_, to_location) = self.locate("rename", to)?;

        if from_location.backend_id != to_location.backend_id {
            warn!(
                from,
                to,
                from_backend = from_location.backend_id,
                to_backend = to_location.backend_id,
                "cannot rename between different backends"
            );
            return Ok(false);
        }

        backend
            .rename(&from_location.physical_path, &to_location.physical_path)
            .await
            .map_err(|e| Self::tag(&from_location, e))
    }
}

/// A router is itself a [`Filesystem`], so routers can stack anywhere a
/// backend fits. Typed router errors degrade to `io::Error` here with a
/// best-fit `ErrorKind`.
#[async_trait]
impl Filesystem for RouterFs {
    async fn open_read(&self, path: &str) -> io::Result<ByteReader> {
        RouterFs::open_read(self, path).await.map_err(Into::into)
    }

    async fn open_write(&self, path: &str, mode: WriteMode) -> io::Result<ByteWriter> {
        RouterFs::open_write(self, path, mode).await.map_err(Into::into)
    }

    async fn list(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        RouterFs::list(self, path).await.map_err(Into::into)
    }

    async fn stat(&self, path: &str) -> io::Result<Metadata> {
        RouterFs::stat(self, path).await.map_err(Into::into)
    }

    async fn mkdir(&self, path: &str) -> io::Result<()> {
        RouterFs::mkdir(self, path).await.map_err(Into::into)
    }

    async fn delete(&self, path: &str, recursive: bool) -> io::Result<bool> {
        RouterFs::delete(self, path, recursive).await.map_err(Into::into)
    }

    async fn rename(&self, from: &str, to: &str) -> io::Result<bool> {
        RouterFs::rename(self, from, to).await.map_err(Into::into)
    }

    fn read_only(&self) -> bool {
        // The router itself isn't read-only; individual backends might be.
        false
    }

    async fn exists(&self, path: &str) -> bool {
        RouterFs::exists(self, path).await.unwrap_or(false)
    }
}

//! Backend registry: backend id → shared filesystem instance.
//!
//! Populated once at startup, before any router call executes. After that
//! point the map is effectively frozen, so concurrent reads need no
//! locking.

use std::sync::Arc;

use indexmap::IndexMap;
use routefs_types::{ConfigError, ConfigResult, RouterError, RouterResult};

use crate::fs::Filesystem;

/// Registered backends, keyed by id.
#[derive(Default)]
pub struct BackendRegistry {
    backends: IndexMap<String, Arc<dyn Filesystem>>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under an id.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        backend: impl Filesystem + 'static,
    ) -> ConfigResult<()> {
        self.register_arc(id, Arc::new(backend))
    }

    /// Register a backend (already wrapped in `Arc`) under an id.
    pub fn register_arc(
        &mut self,
        id: impl Into<String>,
        backend: Arc<dyn Filesystem>,
    ) -> ConfigResult<()> {
        let id = id.into();
        if self.backends.contains_key(&id) {
            return Err(ConfigError::DuplicateBackend(id));
        }
        self.backends.insert(id, backend);
        Ok(())
    }

    /// Look up a backend by id.
    pub fn get(&self, id: &str) -> RouterResult<Arc<dyn Filesystem>> {
        self.backends
            .get(id)
            .cloned()
            .ok_or_else(|| RouterError::UnknownBackend(id.to_string()))
    }

    /// True if a backend with this id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.backends.contains_key(id)
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// True if no backends are registered.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

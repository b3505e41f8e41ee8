//! Error taxonomy for routefs.
//!
//! Two layers, matching the two failure windows:
//!
//! - [`ConfigError`]: construction-time validation failures. Fatal — the
//!   router refuses to come up before any I/O happens.
//! - [`RouterError`]: per-call failures surfaced to the caller. Backend
//!   I/O errors are carried unchanged, tagged with the backend id and the
//!   resolved physical path.

use std::io;
use thiserror::Error;

/// Result type for configuration and registry construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Construction-time configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("empty match prefix in mapping for scheme {0:?}")]
    EmptyMatchPrefix(String),
    #[error("mapping prefix {0:?} has no scheme")]
    PrefixMissingScheme(String),
    #[error("mapping prefix {prefix:?} does not start with its scheme {scheme:?}")]
    PrefixSchemeMismatch { scheme: String, prefix: String },
    #[error("duplicate mapping prefix {prefix:?} for scheme {scheme:?}")]
    DuplicatePrefix { scheme: String, prefix: String },
    #[error("mapping {scheme}.{index} is missing its {missing:?} half")]
    IncompleteMapping {
        scheme: String,
        index: u32,
        missing: &'static str,
    },
    #[error("invalid mapping key {0:?}")]
    InvalidKey(String),
    #[error("backend {0:?} already registered")]
    DuplicateBackend(String),
    #[error("mapping for scheme {scheme:?} references unknown backend {backend:?}")]
    UnknownRuleBackend { scheme: String, backend: String },
    #[error("default filesystem for scheme {scheme:?} references unknown backend {backend:?}")]
    UnknownDefaultBackend { scheme: String, backend: String },
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Per-call routing and delegation errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The logical path has no `scheme://` separator.
    #[error("path {0:?} has no scheme")]
    MalformedPath(String),
    /// No rule matched and the scheme has no default backend.
    #[error("no mapping or default filesystem for path {0:?}")]
    Unroutable(String),
    /// A backend id that is not in the registry. Configuration validation
    /// makes this unreachable through the router facade.
    #[error("unknown backend {0:?}")]
    UnknownBackend(String),
    /// A backend-produced path fell outside its replacement prefix during
    /// reverse translation.
    #[error("physical path {path:?} does not start with prefix {prefix:?}")]
    PrefixMismatch { path: String, prefix: String },
    /// The delegated backend operation failed. The source error is carried
    /// unchanged.
    #[error("backend {backend} failed for {path}: {source}")]
    Backend {
        backend: String,
        path: String,
        #[source]
        source: io::Error,
    },
}

impl RouterError {
    /// Tag a backend-native I/O error with its backend id and physical path.
    pub fn backend(backend: impl Into<String>, path: impl Into<String>, source: io::Error) -> Self {
        RouterError::Backend {
            backend: backend.into(),
            path: path.into(),
            source,
        }
    }
}

impl From<RouterError> for io::Error {
    fn from(err: RouterError) -> Self {
        let kind = match &err {
            RouterError::MalformedPath(_) => io::ErrorKind::InvalidInput,
            RouterError::Unroutable(_) => io::ErrorKind::NotFound,
            RouterError::UnknownBackend(_) => io::ErrorKind::NotFound,
            RouterError::PrefixMismatch { .. } => io::ErrorKind::InvalidData,
            RouterError::Backend { source, .. } => source.kind(),
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_keeps_io_kind() {
        let err = RouterError::backend(
            "lakefs",
            "lakefs://repo/main/a.txt",
            io::Error::new(io::ErrorKind::NotFound, "no such object"),
        );
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
        let msg = io_err.to_string();
        assert!(msg.contains("lakefs"), "message should name the backend: {}", msg);
        assert!(msg.contains("a.txt"), "message should carry the path: {}", msg);
    }

    #[test]
    fn malformed_path_maps_to_invalid_input() {
        let io_err: io::Error = RouterError::MalformedPath("no-scheme".into()).into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
    }
}

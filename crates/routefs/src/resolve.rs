//! Logical-to-physical path resolution.
//!
//! Resolution is pure and side-effect-free: it scans the rule table, never
//! touches storage, and produces a fresh [`ResolvedLocation`] per call.

use routefs_types::{scheme_of, ResolvedLocation, RouterError, RouterResult, SCHEME_SEPARATOR};
use tracing::trace;

use crate::config::RouterConfig;

/// Resolves logical paths against an immutable [`RouterConfig`].
#[derive(Debug, Clone)]
pub struct PathResolver {
    config: RouterConfig,
}

impl PathResolver {
    /// Wrap a validated configuration.
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// The configuration this resolver scans.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Resolve a logical path to its physical location.
    ///
    /// The first rule (in registration order) whose prefix literally
    /// matches wins. Paths with no matching rule fall back to the scheme's
    /// default backend unchanged.
    pub fn resolve(&self, logical_path: &str) -> RouterResult<ResolvedLocation> {
        let scheme = scheme_of(logical_path)
            .ok_or_else(|| RouterError::MalformedPath(logical_path.to_string()))?;

        for rule in self.config.rules().rules_for(scheme) {
            if rule.matches(logical_path) {
                let remainder = &logical_path[rule.match_prefix.len()..];
                let physical_path = format!("{}{}", rule.replacement, remainder);
                trace!(
                    logical = logical_path,
                    physical = physical_path,
                    backend = rule.backend_id,
                    "resolved via mapping"
                );
                return Ok(ResolvedLocation {
                    physical_path,
                    backend_id: rule.backend_id.clone(),
                    matched_prefix: rule.match_prefix.clone(),
                    replacement: rule.replacement.clone(),
                });
            }
        }

        match self.config.default_backend(scheme) {
            Some(backend_id) => {
                let prefix = format!("{}{}", scheme, SCHEME_SEPARATOR);
                trace!(
                    logical = logical_path,
                    backend = backend_id,
                    "no mapping matched, using default filesystem"
                );
                Ok(ResolvedLocation {
                    physical_path: logical_path.to_string(),
                    backend_id: backend_id.to_string(),
                    matched_prefix: prefix.clone(),
                    replacement: prefix,
                })
            }
            None => Err(RouterError::Unroutable(logical_path.to_string())),
        }
    }

    /// Translate a backend-produced physical path back under the logical
    /// prefix of a resolution.
    ///
    /// Listing operations return paths the backend knows; callers expect
    /// them under the prefix they asked about. Fails if the physical path
    /// does not start with the resolution's replacement prefix.
    pub fn unresolve(location: &ResolvedLocation, physical_path: &str) -> RouterResult<String> {
        let remainder = physical_path.strip_prefix(&location.replacement).ok_or_else(|| {
            RouterError::PrefixMismatch {
                path: physical_path.to_string(),
                prefix: location.replacement.clone(),
            }
        })?;
        Ok(format!("{}{}", location.matched_prefix, remainder))
    }
}

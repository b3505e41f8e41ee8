//! Rewrite rules and resolved locations.
//!
//! A [`RewriteRule`] maps a literal path prefix under one scheme to a
//! replacement physical prefix served by a named backend. Rules are literal
//! prefixes only — no glob or regex semantics — so routing stays predictable
//! and auditable.

use crate::error::{ConfigError, ConfigResult};

/// Separator between a path's scheme and the rest of the URI.
pub const SCHEME_SEPARATOR: &str = "://";

/// Extract the scheme portion of a scheme-qualified path.
///
/// Returns `None` when the path has no `://` separator or an empty scheme.
pub fn scheme_of(path: &str) -> Option<&str> {
    match path.split_once(SCHEME_SEPARATOR) {
        Some((scheme, _)) if !scheme.is_empty() => Some(scheme),
        _ => None,
    }
}

/// A prefix-to-prefix mapping plus the backend that serves the rewritten
/// path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    /// Scheme this rule applies to, derived from `match_prefix`.
    pub scheme: String,
    /// Literal prefix a logical path must start with.
    pub match_prefix: String,
    /// Physical prefix substituted for `match_prefix`.
    pub replacement: String,
    /// Id of the backend that serves the rewritten path.
    pub backend_id: String,
}

impl RewriteRule {
    /// Build a rule, deriving and validating its scheme from `match_prefix`.
    pub fn new(
        match_prefix: impl Into<String>,
        replacement: impl Into<String>,
        backend_id: impl Into<String>,
    ) -> ConfigResult<Self> {
        let match_prefix = match_prefix.into();
        if match_prefix.is_empty() {
            return Err(ConfigError::EmptyMatchPrefix(String::new()));
        }
        let scheme = scheme_of(&match_prefix)
            .ok_or_else(|| ConfigError::PrefixMissingScheme(match_prefix.clone()))?
            .to_string();
        Ok(Self {
            scheme,
            match_prefix,
            replacement: replacement.into(),
            backend_id: backend_id.into(),
        })
    }

    /// Check whether this rule applies to a logical path.
    pub fn matches(&self, logical_path: &str) -> bool {
        logical_path.starts_with(&self.match_prefix)
    }
}

/// The outcome of resolving one logical path. Derived per call, never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// Physical path handed to the backend.
    pub physical_path: String,
    /// Backend that performs the I/O.
    pub backend_id: String,
    /// Logical prefix that matched (`"<scheme>://"` for default routing).
    pub matched_prefix: String,
    /// Physical prefix substituted for it (equal to `matched_prefix` for
    /// default routing).
    pub replacement: String,
}

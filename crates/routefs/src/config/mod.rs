//! Immutable router configuration.
//!
//! A [`RouterConfig`] is built once at startup — via the builder, from flat
//! key-value properties, or from a TOML file — validated, and then never
//! mutated. Re-configuration means rebuilding the router.

mod file;
mod properties;

use indexmap::IndexMap;
use routefs_types::{BackendOptions, ConfigResult, RewriteRule};
use tracing::debug;

use crate::rules::RuleTable;

/// Validated routing configuration: ordered rewrite rules, per-scheme
/// default backends, and opaque per-backend options.
#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    rules: RuleTable,
    defaults: IndexMap<String, String>,
    backend_options: IndexMap<String, BackendOptions>,
}

impl RouterConfig {
    /// Start building a configuration.
    pub fn builder() -> RouterConfigBuilder {
        RouterConfigBuilder::default()
    }

    /// The ordered rule table.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Default backend id for a scheme, if configured.
    pub fn default_backend(&self, scheme: &str) -> Option<&str> {
        self.defaults.get(scheme).map(String::as_str)
    }

    /// All configured (scheme, default backend id) pairs.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults
            .iter()
            .map(|(scheme, backend)| (scheme.as_str(), backend.as_str()))
    }

    /// Opaque connection options for a backend, if configured.
    pub fn backend_options(&self, id: &str) -> Option<&BackendOptions> {
        self.backend_options.get(id)
    }
}

/// Builder for [`RouterConfig`]. All validation happens in [`build`],
/// so rules can be declared fluently in any order relative to defaults.
///
/// [`build`]: RouterConfigBuilder::build
#[derive(Debug, Default)]
pub struct RouterConfigBuilder {
    rules: Vec<(String, String, String)>,
    defaults: IndexMap<String, String>,
    backend_options: IndexMap<String, BackendOptions>,
}

impl RouterConfigBuilder {
    /// Append a rewrite rule. Registration order is match priority.
    pub fn rule(
        mut self,
        match_prefix: impl Into<String>,
        replacement: impl Into<String>,
        backend_id: impl Into<String>,
    ) -> Self {
        self.rules
            .push((match_prefix.into(), replacement.into(), backend_id.into()));
        self
    }

    /// Set the default backend for a scheme.
    pub fn default_fs(mut self, scheme: impl Into<String>, backend_id: impl Into<String>) -> Self {
        self.defaults.insert(scheme.into(), backend_id.into());
        self
    }

    /// Attach opaque connection options to a backend id.
    pub fn backend_options(mut self, id: impl Into<String>, options: BackendOptions) -> Self {
        self.backend_options.insert(id.into(), options);
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> ConfigResult<RouterConfig> {
        let mut rules = RuleTable::new();
        for (match_prefix, replacement, backend_id) in self.rules {
            rules.add(RewriteRule::new(match_prefix, replacement, backend_id)?)?;
        }

        for rule in rules.iter() {
            debug!(
                scheme = rule.scheme,
                prefix = rule.match_prefix,
                replacement = rule.replacement,
                backend = rule.backend_id,
                "loaded mapping"
            );
        }
        for (scheme, backend) in &self.defaults {
            debug!(scheme, backend, "loaded default filesystem");
        }

        Ok(RouterConfig {
            rules,
            defaults: self.defaults,
            backend_options: self.backend_options,
        })
    }
}

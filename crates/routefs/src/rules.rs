//! Ordered prefix-rewrite rule table.
//!
//! Rules are grouped per scheme and kept in registration order — order is
//! semantically meaningful because the resolver picks the first match.
//! Callers must register more specific prefixes before more general ones.

use indexmap::IndexMap;
use routefs_types::{ConfigError, ConfigResult, RewriteRule, SCHEME_SEPARATOR};

/// Validated, ordered set of rewrite rules.
///
/// Built once by [`crate::config::RouterConfigBuilder`]; immutable inside a
/// [`crate::RouterConfig`].
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: IndexMap<String, Vec<RewriteRule>>,
}

impl RuleTable {
    /// Create an empty rule table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to its scheme's sequence.
    ///
    /// Validates that the match prefix is non-empty, agrees with the rule's
    /// scheme, and is unique within the scheme.
    pub fn add(&mut self, rule: RewriteRule) -> ConfigResult<()> {
        if rule.match_prefix.is_empty() {
            return Err(ConfigError::EmptyMatchPrefix(rule.scheme));
        }
        let expected = format!("{}{}", rule.scheme, SCHEME_SEPARATOR);
        if !rule.match_prefix.starts_with(&expected) {
            return Err(ConfigError::PrefixSchemeMismatch {
                scheme: rule.scheme,
                prefix: rule.match_prefix,
            });
        }
        let entries = self.rules.entry(rule.scheme.clone()).or_default();
        if entries.iter().any(|r| r.match_prefix == rule.match_prefix) {
            return Err(ConfigError::DuplicatePrefix {
                scheme: rule.scheme,
                prefix: rule.match_prefix,
            });
        }
        entries.push(rule);
        Ok(())
    }

    /// The ordered rule sequence for a scheme.
    pub fn rules_for(&self, scheme: &str) -> &[RewriteRule] {
        self.rules.get(scheme).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All rules, grouped by scheme in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.values().flatten()
    }

    /// Total number of rules across all schemes.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// True if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.values().all(Vec::is_empty)
    }
}

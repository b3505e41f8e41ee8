//! Flat key-value configuration parsing.
//!
//! The hosting engine hands configuration down as flat string properties.
//! Recognized keys:
//!
//! ```text
//! mapping.<scheme>.<n>.replace  = prefix to match
//! mapping.<scheme>.<n>.with     = replacement physical prefix
//! mapping.<scheme>.<n>.backend  = backend id for that rule
//! default.fs.<scheme>           = backend id used when no rule matches
//! backend.<id>.<option>         = opaque backend connection option
//! ```
//!
//! Mappings are paired by `(scheme, n)` and ordered by scheme, then index —
//! the index is the match priority within its scheme. Keys under the
//! recognized prefixes that fail to parse are rejected; anything else in
//! the property bag is not ours and is ignored.

use std::collections::BTreeMap;

use regex::Regex;
use routefs_types::{scheme_of, BackendOptions, ConfigError, ConfigResult};

use super::RouterConfig;

const MAPPING_PREFIX: &str = "mapping.";
const DEFAULT_FS_PREFIX: &str = "default.fs.";
const BACKEND_PREFIX: &str = "backend.";

const MAPPING_KEY_PATTERN: &str =
    r"^mapping\.(?P<scheme>[a-z0-9_-]+)\.(?P<index>\d+)\.(?P<kind>replace|with|backend)$";
const DEFAULT_FS_KEY_PATTERN: &str = r"^default\.fs\.(?P<scheme>[a-z0-9_-]+)$";
const BACKEND_KEY_PATTERN: &str = r"^backend\.(?P<id>[A-Za-z0-9_-]+)\.(?P<key>[a-z0-9-]+)$";

/// One mapping's keys as collected so far; all three must be present by the
/// end of the scan.
#[derive(Debug, Default)]
struct PartialMapping {
    replace: Option<String>,
    with: Option<String>,
    backend: Option<String>,
}

impl RouterConfig {
    /// Build a configuration from flat `(key, value)` properties.
    ///
    /// Iteration order of the input does not matter: mappings are ordered
    /// by `(scheme, index)` regardless of the order their keys arrive in.
    pub fn from_properties<K, V>(props: impl IntoIterator<Item = (K, V)>) -> ConfigResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mapping_re = pattern(MAPPING_KEY_PATTERN)?;
        let default_fs_re = pattern(DEFAULT_FS_KEY_PATTERN)?;
        let backend_re = pattern(BACKEND_KEY_PATTERN)?;

        let mut mappings: BTreeMap<(String, u32), PartialMapping> = BTreeMap::new();
        let mut defaults: BTreeMap<String, String> = BTreeMap::new();
        let mut options: BTreeMap<String, BackendOptions> = BTreeMap::new();

        for (key, value) in props {
            let (key, value) = (key.as_ref(), value.as_ref());
            if key.starts_with(MAPPING_PREFIX) {
                let caps = mapping_re
                    .captures(key)
                    .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
                let scheme = caps["scheme"].to_string();
                let index: u32 = caps["index"]
                    .parse()
                    .map_err(|_| ConfigError::InvalidKey(key.to_string()))?;
                let entry = mappings.entry((scheme, index)).or_default();
                match &caps["kind"] {
                    "replace" => entry.replace = Some(value.to_string()),
                    "with" => entry.with = Some(value.to_string()),
                    _ => entry.backend = Some(value.to_string()),
                }
            } else if key.starts_with(DEFAULT_FS_PREFIX) {
                let caps = default_fs_re
                    .captures(key)
                    .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
                defaults.insert(caps["scheme"].to_string(), value.to_string());
            } else if key.starts_with(BACKEND_PREFIX) {
                let caps = backend_re
                    .captures(key)
                    .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
                options
                    .entry(caps["id"].to_string())
                    .or_default()
                    .set(&caps["key"], value);
            }
        }

        let mut builder = Self::builder();
        for ((scheme, index), partial) in mappings {
            let replace = partial.replace.ok_or_else(|| incomplete(&scheme, index, "replace"))?;
            let with = partial.with.ok_or_else(|| incomplete(&scheme, index, "with"))?;
            let backend = partial.backend.ok_or_else(|| incomplete(&scheme, index, "backend"))?;

            // The replace value must carry the scheme its key claims.
            if scheme_of(&replace) != Some(scheme.as_str()) {
                return Err(ConfigError::PrefixSchemeMismatch {
                    scheme,
                    prefix: replace,
                });
            }
            builder = builder.rule(replace, with, backend);
        }
        for (scheme, backend) in defaults {
            builder = builder.default_fs(scheme, backend);
        }
        for (id, opts) in options {
            builder = builder.backend_options(id, opts);
        }
        builder.build()
    }
}

fn pattern(source: &str) -> ConfigResult<Regex> {
    Regex::new(source).map_err(|e| ConfigError::Parse(e.to_string()))
}

fn incomplete(scheme: &str, index: u32, missing: &'static str) -> ConfigError {
    ConfigError::IncompleteMapping {
        scheme: scheme.to_string(),
        index,
        missing,
    }
}

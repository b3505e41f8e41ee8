//! TOML configuration files.
//!
//! The same configuration surface as the flat properties, in structured
//! form:
//!
//! ```toml
//! [[mapping]]
//! replace = "s3a://bucket/dir/"
//! with = "lakefs://router/main/"
//! backend = "lakefs"
//!
//! [default-fs]
//! s3a = "s3a"
//!
//! [backend.lakefs]
//! endpoint = "https://lakefs.example.com"
//! access-key = "AKIA..."
//! ```
//!
//! Mapping order in the file is match priority.

use std::collections::BTreeMap;
use std::path::Path;

use routefs_types::{BackendOptions, ConfigError, ConfigResult};
use serde::Deserialize;

use super::RouterConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawConfig {
    mapping: Vec<RawMapping>,
    default_fs: BTreeMap<String, String>,
    backend: BTreeMap<String, BackendOptions>,
}

#[derive(Debug, Deserialize)]
struct RawMapping {
    replace: String,
    with: String,
    backend: String,
}

impl RouterConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut builder = Self::builder();
        for mapping in raw.mapping {
            builder = builder.rule(mapping.replace, mapping.with, mapping.backend);
        }
        for (scheme, backend) in raw.default_fs {
            builder = builder.default_fs(scheme, backend);
        }
        for (id, options) in raw.backend {
            builder = builder.backend_options(id, options);
        }
        builder.build()
    }
}

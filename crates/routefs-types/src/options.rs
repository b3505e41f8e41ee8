//! Backend connection options and write modes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Connection parameters for one backend.
///
/// The router never interprets these — they are collected from configuration
/// and handed to the named backend's constructor opaquely. The fields below
/// are the recognized option keys; anything else lands in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BackendOptions {
    /// Service endpoint URL.
    pub endpoint: Option<String>,
    /// Access key id.
    pub access_key: Option<String>,
    /// Secret access key.
    pub secret_key: Option<String>,
    /// Use path-style addressing instead of virtual-hosted-style.
    pub path_style_access: bool,
    /// Unrecognized options, passed through verbatim.
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

impl BackendOptions {
    /// Set an option by its configuration key.
    ///
    /// Recognized keys fill the typed fields; unrecognized keys are kept in
    /// `extra` without inspection.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            "endpoint" => self.endpoint = Some(value),
            "access-key" => self.access_key = Some(value),
            "secret-key" => self.secret_key = Some(value),
            "path-style-access" => self.path_style_access = value == "true",
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }
}

/// Write mode for `open_write`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail if the file already exists.
    CreateNew,
    /// Overwrite an existing file (default).
    #[default]
    Overwrite,
    /// Append to an existing file, creating it if absent.
    Append,
}

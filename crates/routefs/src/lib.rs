//! routefs: a prefix-rewrite routing virtual filesystem.
//!
//! This crate provides:
//!
//! - **Filesystem**: the backend contract — async read/write streams, list,
//!   stat, delete over scheme-qualified paths
//! - **RuleTable**: ordered prefix-rewrite mappings, validated at build time
//! - **PathResolver**: first-match-wins prefix resolution with per-scheme
//!   default fallback
//! - **BackendRegistry**: backend id → shared filesystem instance
//! - **RouterFs**: the facade that resolves every call and delegates it to
//!   the selected backend
//! - **Config**: immutable [`RouterConfig`] built from a builder, flat
//!   properties, or a TOML file
//!
//! # Design
//!
//! The router is a stateless dispatcher over immutable configuration:
//!
//! ```text
//! caller ── logical path ──▶ RouterFs
//!                              │ resolve()          (pure, no I/O)
//!                              ▼
//!                          PathResolver ── RuleTable / defaults
//!                              │ ResolvedLocation
//!                              ▼
//!                          BackendRegistry ──▶ Arc<dyn Filesystem>
//!                                                │ physical I/O
//!                                                ▼
//!                                             backend store
//! ```
//!
//! Rules are matched in registration order; register more specific prefixes
//! before more general ones.

pub mod config;
pub mod fs;
pub mod registry;
pub mod resolve;
pub mod router;
pub mod rules;

pub use config::{RouterConfig, RouterConfigBuilder};
pub use fs::{ByteReader, ByteWriter, Filesystem, LocalFs, MemoryFs};
pub use registry::BackendRegistry;
pub use resolve::PathResolver;
pub use router::RouterFs;
pub use rules::RuleTable;

// Re-export the data crate so embedders need only one dependency.
pub use routefs_types as types;
pub use routefs_types::{
    BackendOptions, ConfigError, ConfigResult, DirEntry, DirEntryKind, Metadata, ResolvedLocation,
    RewriteRule, RouterError, RouterResult, WriteMode,
};

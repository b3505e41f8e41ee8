//! Pure data types for routefs — errors, rewrite rules, directory entries.
//!
//! This crate is a leaf dependency with no async runtime and no I/O. It
//! exists so that backends and embedders can speak routefs' type system
//! without pulling in the router's dependency tree.

pub mod entry;
pub mod error;
pub mod options;
pub mod rule;

// Flat re-exports for convenience
pub use entry::*;
pub use error::*;
pub use options::*;
pub use rule::*;

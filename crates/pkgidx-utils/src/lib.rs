//! Shared helpers for the pkgidx crates: filesystem access with path-aware
//! errors, directory walking, file name filters, path expansion and duration
//! parsing.

pub mod error;
pub mod fs;
pub mod path;
pub mod pattern;
pub mod time;

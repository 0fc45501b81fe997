//! Configuration for pkgidx: a TOML file with batch, normalization,
//! parsing, boundary, repository and server sections.

pub mod annotations;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod repository;

#[cfg(test)]
pub mod test_utils;

//! Error types for the registry crate.

use miette::Diagnostic;
use pkgidx_config::error::ConfigError;
use thiserror::Error;

/// Errors that stop a fetch before any request is made.
///
/// Failures of individual downloads are not errors at this level; they are
/// collected in the [`FetchReport`](crate::FetchReport).
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

use std::path::PathBuf;

use miette::Diagnostic;
use pkgidx_config::error::ConfigError;
use pkgidx_core::CoreError;
use pkgidx_utils::error::FileSystemError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum OperationError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(pkgidx_operations::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),

    #[error("Repository not found: {}", .path.display())]
    #[diagnostic(
        code(pkgidx_operations::index_not_found),
        help("Run `pkgidx fetch` and `pkgidx parse` to build the index first")
    )]
    IndexNotFound { path: PathBuf },

    #[error("Package not found: {name}")]
    #[diagnostic(code(pkgidx_operations::package_not_found))]
    PackageNotFound { name: String },

    #[error("Corrupt index {}: {source}", .path.display())]
    #[diagnostic(
        code(pkgidx_operations::corrupt_index),
        help("Re-run `pkgidx parse` to regenerate the file")
    )]
    CorruptIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    #[diagnostic(code(pkgidx_operations::thread_pool))]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, OperationError>;

pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            OperationError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

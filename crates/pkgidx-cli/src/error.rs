use miette::Diagnostic;
use pkgidx_config::error::ConfigError;
use pkgidx_operations::OperationError;
use pkgidx_registry::RegistryError;
use pkgidx_utils::error::PathError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error("Error while {action}: {source}")]
    #[diagnostic(code(pkgidx::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error("Invalid proxy `{proxy}`: {reason}")]
    #[diagnostic(code(pkgidx::proxy), help("Use a URL such as http://127.0.0.1:3128"))]
    InvalidProxy { proxy: String, reason: String },

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(pkgidx::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(pkgidx::toml))]
    Toml(#[from] toml::ser::Error),

    #[error("{failed} of {total} file(s) failed")]
    #[diagnostic(code(pkgidx::batch_failed))]
    BatchFailed { failed: usize, total: usize },
}

pub type CliResult<T> = std::result::Result<T, CliError>;

pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            CliError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

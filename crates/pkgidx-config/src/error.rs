use miette::Diagnostic;
use pkgidx_core::CoreError;
use pkgidx_utils::error::{FileSystemError, PathError, UtilsError};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(pkgidx_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(pkgidx_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(pkgidx_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("`parallel_limit` must be greater than zero")]
    #[diagnostic(code(pkgidx_config::parallel_limit))]
    InvalidParallelLimit,

    #[error("`repository.{0}` must list at least one value")]
    #[diagnostic(
        code(pkgidx_config::empty_dimension),
        help("Remove the key to use the built-in defaults")
    )]
    EmptyRepositoryDimension(&'static str),

    #[error("Invalid repository URL: {0}")]
    #[diagnostic(
        code(pkgidx_config::invalid_repository_url),
        help("Use an absolute http(s) URL ending with `/`, e.g. https://deb.parrot.sh/parrot/dists/")
    )]
    InvalidRepositoryUrl(String),

    #[error("Invalid duration: {0}")]
    #[diagnostic(
        code(pkgidx_config::invalid_duration),
        help("Use a duration such as `30s`, `2m` or `1h30m`")
    )]
    InvalidDuration(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    #[diagnostic(code(pkgidx_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Utils(#[from] UtilsError),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(pkgidx_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(pkgidx_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

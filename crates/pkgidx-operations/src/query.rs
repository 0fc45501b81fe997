use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use pkgidx_core::{Collection, CoreError};
use tracing::debug;

use crate::{
    error::{ErrorContext, OperationError, Result},
    types::QueryResult,
};

pub const INDEX_FILE: &str = "Packages.json";

/// Locates one parsed index below the data root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSelector {
    pub codename: Option<String>,
    pub branch: String,
    /// Either `amd64` or the directory name `binary-amd64`.
    pub architecture: String,
}

impl IndexSelector {
    pub fn new(branch: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            codename: None,
            branch: branch.into(),
            architecture: architecture.into(),
        }
    }

    pub fn with_codename(mut self, codename: impl Into<String>) -> Self {
        self.codename = Some(codename.into());
        self
    }

    fn arch_dir(&self) -> String {
        if self.architecture.starts_with("binary-") {
            self.architecture.clone()
        } else {
            format!("binary-{}", self.architecture)
        }
    }

    /// `{data_root}/[{codename}/]{branch}/binary-{arch}/Packages.json`
    pub fn index_path(&self, data_root: &Path) -> PathBuf {
        let mut path = data_root.to_path_buf();
        if let Some(codename) = &self.codename {
            path.push(codename);
        }
        path.push(&self.branch);
        path.push(self.arch_dir());
        path.push(INDEX_FILE);
        path
    }
}

/// Reads a parsed index. A missing file is [`OperationError::IndexNotFound`]
/// and unparseable JSON is [`OperationError::CorruptIndex`].
pub fn load_index(path: &Path) -> Result<Collection> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(OperationError::IndexNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading index {}", path.display()));
        }
    };

    Collection::from_json(&content).map_err(|err| {
        match err {
            CoreError::Json(source) => {
                OperationError::CorruptIndex {
                    path: path.to_path_buf(),
                    source,
                }
            }
            other => OperationError::Core(other),
        }
    })
}

/// Looks up `package` in the index chosen by `selector`, or returns the
/// whole index when no name is given.
pub fn query_packages(
    data_root: &Path,
    selector: &IndexSelector,
    package: Option<&str>,
) -> Result<QueryResult> {
    let path = selector.index_path(data_root);
    debug!("querying {}", path.display());
    let collection = load_index(&path)?;

    match package {
        Some(name) => {
            collection
                .find_package(name)
                .cloned()
                .map(QueryResult::Single)
                .ok_or_else(|| {
                    OperationError::PackageNotFound {
                        name: name.to_string(),
                    }
                })
        }
        None => Ok(QueryResult::All(collection)),
    }
}

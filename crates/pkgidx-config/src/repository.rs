use std::time::Duration;

use documented::{Documented, DocumentedFields};
use pkgidx_utils::time::parse_duration;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

pub const DEFAULT_BASE_URL: &str = "https://deb.parrot.sh/parrot/dists/";

pub const DEFAULT_CODENAMES: &[&str] = &["lory", "lory-backports", "lory-updates", "lory-security"];

pub const DEFAULT_BRANCHES: &[&str] = &["main", "contrib", "non-free", "non-free-firmware"];

pub const DEFAULT_ARCHITECTURES: &[&str] = &[
    "binary-amd64",
    "binary-arm64",
    "binary-armhf",
    "binary-i386",
];

pub const DEFAULT_TIMEOUT: &str = "30s";

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// The remote repository `Packages` files are fetched from.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct RepositorySettings {
    /// Base URL of the `dists/` directory. A missing trailing `/` is added.
    /// Default: "https://deb.parrot.sh/parrot/dists/"
    pub base_url: Option<String>,

    /// Codenames that may be fetched.
    /// Default: ["lory", "lory-backports", "lory-updates", "lory-security"]
    pub codenames: Option<Vec<String>>,

    /// Branches (components) that may be fetched.
    /// Default: ["main", "contrib", "non-free", "non-free-firmware"]
    pub branches: Option<Vec<String>>,

    /// Architecture directories that may be fetched.
    /// Default: ["binary-amd64", "binary-arm64", "binary-armhf", "binary-i386"]
    pub architectures: Option<Vec<String>>,

    /// Timeout for each download request (e.g. "30s", "2m").
    /// Default: "30s"
    pub timeout: Option<String>,
}

impl RepositorySettings {
    pub fn defaults() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            codenames: Some(owned(DEFAULT_CODENAMES)),
            branches: Some(owned(DEFAULT_BRANCHES)),
            architectures: Some(owned(DEFAULT_ARCHITECTURES)),
            timeout: Some(DEFAULT_TIMEOUT.to_string()),
        }
    }

    pub(crate) fn resolve(&mut self) -> Result<()> {
        let base_url = self
            .base_url
            .get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
        parse_base_url(base_url)?;

        for (name, values, defaults) in [
            ("codenames", &mut self.codenames, DEFAULT_CODENAMES),
            ("branches", &mut self.branches, DEFAULT_BRANCHES),
            ("architectures", &mut self.architectures, DEFAULT_ARCHITECTURES),
        ] {
            if values.get_or_insert_with(|| owned(defaults)).is_empty() {
                return Err(ConfigError::EmptyRepositoryDimension(name));
            }
        }

        let timeout = self
            .timeout
            .get_or_insert_with(|| DEFAULT_TIMEOUT.to_string());
        if parse_duration(timeout).is_none() {
            return Err(ConfigError::InvalidDuration(timeout.clone()));
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn codenames(&self) -> Vec<String> {
        self.codenames
            .clone()
            .unwrap_or_else(|| owned(DEFAULT_CODENAMES))
    }

    pub fn branches(&self) -> Vec<String> {
        self.branches
            .clone()
            .unwrap_or_else(|| owned(DEFAULT_BRANCHES))
    }

    pub fn architectures(&self) -> Vec<String> {
        self.architectures
            .clone()
            .unwrap_or_else(|| owned(DEFAULT_ARCHITECTURES))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(Duration::from_secs(30))
    }
}

/// Parses a repository base URL, which must be absolute http(s).
pub fn parse_base_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|_| ConfigError::InvalidRepositoryUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
        return Err(ConfigError::InvalidRepositoryUrl(url.to_string()));
    }
    Ok(parsed)
}

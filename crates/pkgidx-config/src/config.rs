use std::{
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock},
};

use documented::{Documented, DocumentedFields};
use pkgidx_core::{Normalizer, RecordParser};
use pkgidx_utils::path::{resolve_path, xdg_config_home};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::{annotate_toml_table, annotate_toml_tables},
    error::{ConfigError, Result},
    pipeline::{
        build_normalizer, BoundarySettings, NormalizeSettings, ParseSettings, ServerSettings,
    },
    repository::RepositorySettings,
};

pub const DEFAULT_PARALLEL_LIMIT: u32 = 4;
pub const DEFAULT_DATA_PATH: &str = "output";

/// Application's configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct Config {
    /// If true, files in a batch are processed in parallel.
    /// Default: true
    pub parallel: Option<bool>,

    /// Maximum number of files processed at once.
    /// Default: 4
    pub parallel_limit: Option<u32>,

    /// Directory holding parsed `Packages.json` indexes, laid out as
    /// `[codename/]branch/binary-arch/Packages.json`. Relative paths are
    /// resolved against the working directory.
    /// Default: "output"
    pub data_path: Option<String>,

    /// Field normalization settings.
    pub normalize: NormalizeSettings,

    /// Record parsing settings.
    pub parse: ParseSettings,

    /// Field boundary detection settings.
    pub boundary: BoundarySettings,

    /// Remote repository settings.
    pub repository: RepositorySettings,

    /// HTTP query endpoint settings.
    pub server: ServerSettings,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("PKGIDX_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("pkgidx").join("config.toml"),
    })
});

pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub fn set_config_path(path: impl Into<PathBuf>) {
    *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner) = path.into();
}

/// Loads the configuration file into the global slot.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
    Ok(())
}

/// Returns the loaded configuration, or the defaults when [`init`] has not
/// run.
pub fn get_config() -> Config {
    let guard = CONFIG.read().unwrap_or_else(PoisonError::into_inner);
    guard.clone().unwrap_or_else(Config::default_config)
}

impl Config {
    pub fn default_config() -> Self {
        let mut config = Self {
            parallel: Some(true),
            parallel_limit: Some(DEFAULT_PARALLEL_LIMIT),
            data_path: Some(DEFAULT_DATA_PATH.to_string()),
            repository: RepositorySettings::defaults(),
            ..Default::default()
        };
        config.fill_defaults();
        config
    }

    /// Reads the file at [`config_path`]. A missing file yields the
    /// defaults.
    pub fn new() -> Result<Self> {
        Self::load(&config_path())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default_config(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;
        Ok(config)
    }

    fn fill_defaults(&mut self) {
        let normalize = &mut self.normalize;
        normalize
            .long_form_fields
            .get_or_insert_with(|| NormalizeSettings::default().long_form_fields());
        normalize
            .list_form_fields
            .get_or_insert_with(|| NormalizeSettings::default().list_form_fields());
        normalize
            .output_prefix
            .get_or_insert_with(|| NormalizeSettings::default().output_prefix().to_string());
        if normalize.name_prefix.is_none() {
            normalize.name_prefix = NormalizeSettings::default().name_filter().prefix;
        }

        let parse = &mut self.parse;
        if parse.name_suffix.is_none() {
            parse.name_suffix = ParseSettings::default().name_filter().suffix;
        }
        parse
            .identity_field
            .get_or_insert_with(|| ParseSettings::default().identity_field().to_string());

        let boundary = &mut self.boundary;
        boundary.fallback.get_or_insert(true);
        boundary
            .fallback_pattern
            .get_or_insert_with(|| BoundarySettings::default().fallback_pattern().to_string());

        self.server
            .bind
            .get_or_insert_with(|| ServerSettings::default().bind().to_string());
    }

    /// Fills unset values with defaults and validates the result.
    pub fn resolve(&mut self) -> Result<()> {
        if self.parallel_limit == Some(0) {
            return Err(ConfigError::InvalidParallelLimit);
        }
        self.parallel.get_or_insert(true);
        self.parallel_limit.get_or_insert(DEFAULT_PARALLEL_LIMIT);
        self.data_path
            .get_or_insert_with(|| DEFAULT_DATA_PATH.to_string());

        self.fill_defaults();
        self.repository.resolve()?;

        // Rejects bad patterns and fields listed in both classes.
        self.normalizer()?;

        Ok(())
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    /// Worker count for batch jobs; 1 when parallelism is off.
    pub fn parallel_limit(&self) -> usize {
        if self.is_parallel() {
            self.parallel_limit.unwrap_or(DEFAULT_PARALLEL_LIMIT).max(1) as usize
        } else {
            1
        }
    }

    pub fn get_data_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("PKGIDX_DATA") {
            return Ok(resolve_path(&env_path)?);
        }
        Ok(resolve_path(
            self.data_path.as_deref().unwrap_or(DEFAULT_DATA_PATH),
        )?)
    }

    pub fn normalizer(&self) -> Result<Normalizer> {
        build_normalizer(&self.normalize, &self.boundary)
    }

    pub fn record_parser(&self) -> RecordParser {
        self.parse.record_parser()
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;
        annotate_toml_tables(&mut doc)?;

        Ok(doc)
    }
}

/// Writes the annotated default configuration to [`config_path`].
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(config_path)
}

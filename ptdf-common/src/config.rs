//! Configuration loading and path resolution
//!
//! Every value is resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the loader logs a warning and
//! continues with compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the directory with the plain text data files
pub const DATA_DIR_ENV: &str = "PTDF_DATA_DIR";

/// Environment variable naming the destination SQLite database file
pub const DATABASE_ENV: &str = "PTDF_DATABASE";

/// Largest batch the SQLite store accepts in one bulk insert
const DEFAULT_MAX_BATCH_ROWS: usize = 20_000;

/// Loader configuration
///
/// Deserialized from TOML; every field has a built-in default so a partial
/// (or empty) file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory containing the compressed plain text data files
    pub data_dir: Option<PathBuf>,

    /// Destination SQLite database file
    pub database: Option<PathBuf>,

    /// Title cache flushes whenever its id counter crosses a multiple of this
    pub title_flush_every: u64,

    /// Person cache flushes whenever its id counter crosses a multiple of this
    pub person_flush_every: u64,

    /// Default threshold for fact writers
    pub fact_flush_every: u64,

    /// Recursion bound for the halving retry on overflow
    pub max_split_depth: u32,

    /// First id handed out by the title cache
    pub title_id_offset: i64,

    /// First id handed out by the person cache
    pub person_id_offset: i64,

    /// Scan progress is logged every this many records
    pub progress_every: u64,

    /// Drop and recreate the destination tables before loading
    pub drop_existing: bool,

    /// Pre-populate the key caches from an existing database
    pub resume: bool,

    /// Batches larger than this are rejected by the store as overflow
    pub max_batch_rows: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database: None,
            title_flush_every: 18_000,
            person_flush_every: 18_000,
            fact_flush_every: 20_000,
            max_split_depth: 5,
            title_id_offset: 1,
            person_id_offset: 1,
            progress_every: 10_000,
            drop_existing: false,
            resume: false,
            max_batch_rows: DEFAULT_MAX_BATCH_ROWS,
        }
    }
}

impl LoaderConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LoaderConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path, or from the platform
    /// default location when `explicit` is `None`.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file falls back to built-in defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
            })?;
            info!("Loaded configuration from {}", path.display());
            return Self::from_toml_str(&content);
        }

        match default_config_file() {
            Some(path) => {
                let content = std::fs::read_to_string(&path)?;
                info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&content)
            }
            None => {
                warn!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.title_flush_every == 0 || self.person_flush_every == 0 || self.fact_flush_every == 0 {
            return Err(Error::Config("flush thresholds must be positive".to_string()));
        }
        if self.max_split_depth == 0 {
            return Err(Error::Config("max_split_depth must be at least 1".to_string()));
        }
        if self.title_id_offset < 1 || self.person_id_offset < 1 {
            return Err(Error::Config("id offsets must be positive".to_string()));
        }
        if self.max_batch_rows == 0 {
            return Err(Error::Config("max_batch_rows must be positive".to_string()));
        }
        Ok(())
    }
}

/// Resolve the data directory: CLI → `PTDF_DATA_DIR` → TOML.
///
/// There is no compiled default: loading without input files is an error.
pub fn resolve_data_dir(cli_arg: Option<&Path>, config: &LoaderConfig) -> Result<PathBuf> {
    resolve_path(cli_arg, DATA_DIR_ENV, config.data_dir.as_deref()).ok_or_else(|| {
        Error::Config(format!(
            "No data directory given. Use --data-dir, {} or data_dir in the config file",
            DATA_DIR_ENV
        ))
    })
}

/// Resolve the database file: CLI → `PTDF_DATABASE` → TOML → OS default
pub fn resolve_database(cli_arg: Option<&Path>, config: &LoaderConfig) -> PathBuf {
    resolve_path(cli_arg, DATABASE_ENV, config.database.as_deref())
        .unwrap_or_else(default_database_path)
}

fn resolve_path(cli_arg: Option<&Path>, env_var_name: &str, toml_value: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    toml_value.map(Path::to_path_buf)
}

/// Platform default configuration file, if one exists
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("ptdf").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/ptdf/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ptdf").join("ptdf.db"))
        .unwrap_or_else(|| PathBuf::from("./ptdf.db"))
}

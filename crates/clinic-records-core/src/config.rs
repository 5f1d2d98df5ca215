//! Store configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! environment variables. Callers may override individual fields afterwards.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "clinicPatients";

/// Database file used when none is configured.
pub const DEFAULT_DATABASE_PATH: &str = "clinic.db";

pub const ENV_DATABASE_PATH: &str = "CLINIC_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "CLINIC_STORAGE_KEY";
pub const ENV_IMPORT_POLICY: &str = "CLINIC_IMPORT_POLICY";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// How strictly bulk imports are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Every record needs a non-empty name, an age and a non-empty disease.
    /// Age range and minimum lengths are not checked.
    #[default]
    Structural,
    /// Every record must also satisfy the add/update field rules.
    Strict,
}

impl FromStr for ImportPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structural" => Ok(ImportPolicy::Structural),
            "strict" => Ok(ImportPolicy::Strict),
            _ => Err(ConfigError::InvalidValue {
                name: "import_policy",
                value: s.to_string(),
            }),
        }
    }
}

/// Settings for opening a [`crate::PatientStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Key the collection is stored under
    pub storage_key: String,
    /// Bulk import strictness
    pub import_policy: ImportPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            import_policy: ImportPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Parse a JSON config document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Apply `CLINIC_*` environment overrides.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(key) = lookup(ENV_STORAGE_KEY).filter(|v| !v.is_empty()) {
            self.storage_key = key;
        }
        if let Some(policy) = lookup(ENV_IMPORT_POLICY).filter(|v| !v.is_empty()) {
            self.import_policy = policy.parse()?;
        }
        Ok(self)
    }
}

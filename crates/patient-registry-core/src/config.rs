//! Registry configuration.
//!
//! Resolution order, later wins: built-in defaults, JSON config file,
//! `PATIENT_REGISTRY_DB` environment variable, explicit CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagram::DEFAULT_OUTPUT_DIR;

/// Environment variable overriding the database path.
pub const DATABASE_ENV: &str = "PATIENT_REGISTRY_DB";

/// Default SQLite file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "patient-registry.db";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Where `domain-models.puml` is written
    pub diagram_output_dir: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            diagram_output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl RegistryConfig {
    /// Read a JSON config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Apply environment overrides using `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup(DATABASE_ENV).filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(db);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.database_path, PathBuf::from("patient-registry.db"));
        assert_eq!(config.diagram_output_dir, PathBuf::from("storage/uml/"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, r#"{ "database_path": "/var/lib/registry.db" }"#).unwrap();

        let config = RegistryConfig::from_file(&path).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/registry.db"));
        assert_eq!(config.diagram_output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = RegistryConfig::default().with_env(|key| {
            (key == DATABASE_ENV).then(|| "/tmp/override.db".to_string())
        });
        assert_eq!(config.database_path, PathBuf::from("/tmp/override.db"));

        let untouched = RegistryConfig::default().with_env(|_| Some(String::new()));
        assert_eq!(untouched, RegistryConfig::default());
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            RegistryConfig::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "[]").unwrap();
        assert!(matches!(
            RegistryConfig::from_file(&bad),
            Err(ConfigError::Parse { .. })
        ));
    }
}

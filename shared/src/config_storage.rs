//! Persistent storage for bot settings.
//!
//! Settings are stored as pretty-printed JSON documents, one file per named
//! entry, in ~/.rps_config/ by default.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid entry name: {0:?}")]
    InvalidName(String),
}

/// Configuration storage manager.
///
/// Manages loading and saving of named configuration documents from a
/// centralized directory (defaults to ~/.rps_config/).
#[derive(Debug, Clone)]
pub struct ConfigStorage {
    /// Root directory for all configuration (e.g., ~/.rps_config)
    root_path: PathBuf,
}

impl ConfigStorage {
    /// Create a new config storage with default path (~/.rps_config)
    pub fn new() -> std::io::Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
        let root_path = PathBuf::from(home).join(".rps_config");
        Ok(Self { root_path })
    }

    /// Create a new config storage with custom root path
    pub fn with_path(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Get the root configuration path
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf, ConfigStorageError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ConfigStorageError::InvalidName(name.to_string()));
        }
        Ok(self.root_path.join(format!("{name}.json")))
    }

    /// Load the entry called `name`.
    ///
    /// Returns None if no such entry exists.
    /// Returns Some(Err) if the file exists but cannot be loaded.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<Result<T, ConfigStorageError>> {
        let path = match self.entry_path(name) {
            Ok(path) => path,
            Err(e) => return Some(Err(e)),
        };

        if !path.exists() {
            return None;
        }

        Some(
            std::fs::read_to_string(&path)
                .map_err(ConfigStorageError::from)
                .and_then(|text| serde_json::from_str(&text).map_err(ConfigStorageError::from)),
        )
    }

    /// Save `value` under `name`.
    ///
    /// Creates the config directory if it doesn't exist.
    /// Returns the path where the entry was saved.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, ConfigStorageError> {
        let path = self.entry_path(name)?;
        std::fs::create_dir_all(&self.root_path)?;

        let text = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, text)?;
        log::debug!("Saved config entry {name} to {}", path.display());
        Ok(path)
    }

    /// Delete the entry called `name`.
    ///
    /// Returns Ok(true) if the file was deleted, Ok(false) if it didn't exist.
    pub fn delete(&self, name: &str) -> Result<bool, ConfigStorageError> {
        let path = self.entry_path(name)?;

        if !path.exists() {
            return Ok(false);
        }

        std::fs::remove_file(path)?;
        Ok(true)
    }

    /// Names of all stored entries, sorted.
    pub fn list(&self) -> std::io::Result<Vec<String>> {
        if !self.root_path.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root_path)? {
            let path = entry?.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

impl Default for ConfigStorage {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_path(PathBuf::from(".rps_config")))
    }
}

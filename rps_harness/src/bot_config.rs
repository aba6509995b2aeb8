//! Persisted bot configuration.

use std::path::PathBuf;

use game_flow::{BotError, GameConfig};
use motion::MotionConfig;
use serde::{Deserialize, Serialize};
use shared::config_storage::{ConfigStorage, ConfigStorageError};
use thiserror::Error;

/// Name the bot configuration is stored under unless told otherwise.
pub const DEFAULT_CONFIG_NAME: &str = "rps_bot";

#[derive(Error, Debug)]
pub enum BotConfigError {
    #[error("config storage error: {0}")]
    Storage(#[from] ConfigStorageError),
    #[error(transparent)]
    Invalid(#[from] BotError),
}

/// Estimator and controller settings stored together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub motion: MotionConfig,
    pub game: GameConfig,
}

impl BotConfig {
    pub fn validate(&self) -> Result<(), BotError> {
        self.motion.validate()?;
        self.game.validate()?;
        Ok(())
    }

    /// Load and validate the named configuration, `None` if it was never saved.
    pub fn load(storage: &ConfigStorage, name: &str) -> Result<Option<Self>, BotConfigError> {
        match storage.get::<BotConfig>(name) {
            None => Ok(None),
            Some(loaded) => {
                let config = loaded?;
                config.validate()?;
                Ok(Some(config))
            }
        }
    }

    /// Validate and store under `name`, returning the file written.
    pub fn save(&self, storage: &ConfigStorage, name: &str) -> Result<PathBuf, BotConfigError> {
        self.validate()?;
        let path = storage.save(name, self)?;
        log::info!("Saved bot config to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_flow::GameConfigError;
    use shared::moves::Move;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(dir.path().to_path_buf());

        assert!(BotConfig::load(&storage, DEFAULT_CONFIG_NAME).unwrap().is_none());

        let mut config = BotConfig::default();
        config.game.repertoire = vec![Move::Rock, Move::Scissors];
        config.motion.lookback_secs = 4.0;
        config.save(&storage, DEFAULT_CONFIG_NAME).unwrap();

        let loaded = BotConfig::load(&storage, DEFAULT_CONFIG_NAME).unwrap();
        assert_eq!(loaded, Some(config));
    }

    #[test]
    fn test_invalid_config_not_saved() {
        let dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(dir.path().to_path_buf());

        let mut config = BotConfig::default();
        config.game.repertoire.clear();

        let err = config.save(&storage, "broken").unwrap_err();
        assert!(matches!(
            err,
            BotConfigError::Invalid(BotError::Game(GameConfigError::EmptyRepertoire))
        ));
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_stored_config_rejected() {
        let dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(dir.path().to_path_buf());
        std::fs::write(
            dir.path().join("edited.json"),
            r#"{"game": {"start_phase": 5.0}}"#,
        )
        .unwrap();

        let err = BotConfig::load(&storage, "edited").unwrap_err();
        assert!(matches!(
            err,
            BotConfigError::Invalid(BotError::Game(GameConfigError::PhaseOrder { .. }))
        ));
    }
}

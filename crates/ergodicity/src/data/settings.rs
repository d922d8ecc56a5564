//! YAML settings file
//!
//! ```yaml
//! coin_flip:
//!   initial_amount: 1000.0
//!   leverage: 1.0
//!   trials: 100000
//!   source:
//!     type: Synthetic
//!     steps: 60
//!     gain_pct: 0.5
//!     loss_pct: 0.4
//! market:
//!   prices_path: prices.csv
//!   tickers: [NASDAQ, SP500]
//!   simulation:
//!     leverage: 1.0
//! ```
//!
//! Every field has a default, so a partial file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use ergodicity_core::config::{EnsembleConfig, MarketConfig};
use serde::{Deserialize, Serialize};

use crate::util::io::atomic_write;

pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Error types for settings storage
#[derive(Debug)]
pub enum StorageError {
    Io(String),
    Parse(String),
    Serialize(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "IO error: {msg}"),
            StorageError::Parse(msg) => write!(f, "Parse error: {msg}"),
            StorageError::Serialize(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Market-run settings: where prices live and which assets to run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices_path: Option<PathBuf>,
    /// Empty means every ticker in the price file
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub simulation: MarketConfig,
}

/// Contents of `settings.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub coin_flip: EnsembleConfig,
    #[serde(default)]
    pub market: MarketSettings,
}

/// `~/.ergodicity/`
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ergodicity")
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self, StorageError> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| StorageError::Parse(format!("Failed to parse settings: {e}")))
    }

    pub fn to_yaml(&self) -> Result<String, StorageError> {
        serde_saphyr::to_string(self)
            .map_err(|e| StorageError::Serialize(format!("Failed to serialize settings: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = fs::read_to_string(path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {e}", path.display()))
        })?;
        let settings = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Defaults when `path` does not exist; a file that exists must parse
    pub fn load_or_default(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let yaml = self.to_yaml()?;
        atomic_write(path, &yaml).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), "saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ergodicity_core::config::DateRange;
    use ergodicity_core::source::EventSource;
    use jiff::civil::date;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_fills_defaults() {
        let yaml = "coin_flip:\n  leverage: 0.5\n  trials: 200\n";
        let settings = Settings::from_yaml(yaml).unwrap();

        assert_eq!(settings.coin_flip.leverage, 0.5);
        assert_eq!(settings.coin_flip.trials, 200);
        assert_eq!(settings.coin_flip.initial_amount, 1_000.0);
        assert_eq!(settings.coin_flip.source, EventSource::default());
        assert_eq!(settings.market, MarketSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);

        let mut settings = Settings::default();
        settings.coin_flip.seed = Some(42);
        settings.coin_flip.source = EventSource::coin_flip(30, 0.25, 0.2);
        settings.market.prices_path = Some(PathBuf::from("prices.csv"));
        settings.market.tickers = vec!["NASDAQ".to_string()];
        settings.market.simulation.range =
            Some(DateRange::new(date(1995, 1, 10), date(2020, 1, 31)).unwrap());

        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        assert_eq!(Settings::load_or_default(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "coin_flip:\n  trials: [not, a, number]\n").unwrap();

        let err = Settings::load_or_default(&path).unwrap_err();
        assert!(matches!(err, StorageError::Parse(_)));
    }
}

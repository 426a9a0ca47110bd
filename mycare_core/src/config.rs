//! Configuration file support for MyCare.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/mycare/config.toml`.

use crate::prediction::{FallbackPolicy, Fallbacks};
use crate::stats::{DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// The user's own idea of their cycle, used as prediction fallbacks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_average_cycle_length")]
    pub average_cycle_length: i64,

    #[serde(default = "default_average_period_length")]
    pub average_period_length: i64,

    #[serde(default)]
    pub fallback_policy: FallbackPolicy,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            average_cycle_length: default_average_cycle_length(),
            average_period_length: default_average_period_length(),
            fallback_policy: FallbackPolicy::default(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(".local/share")
    });
    base.join("mycare")
}

fn default_average_cycle_length() -> i64 {
    DEFAULT_CYCLE_LENGTH
}

fn default_average_period_length() -> i64 {
    DEFAULT_PERIOD_LENGTH
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
        base.join("mycare").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Validated profile averages for the prediction engine
    pub fn fallbacks(&self) -> Result<Fallbacks> {
        Fallbacks::new(
            self.profile.average_cycle_length,
            self.profile.average_period_length,
        )
        .map_err(|e| Error::Config(e.to_string()))
    }
}

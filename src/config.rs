use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::milestone::MilestoneThresholds;
use crate::session::policy::MatchPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid {kind} milestone threshold {value}")]
    InvalidThreshold { kind: &'static str, value: u32 },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub match_policy: MatchPolicy,
    #[serde(default)]
    pub milestones: MilestoneThresholds,
}

impl Config {
    /// Loads the default config file, falling back to defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_default(&Self::config_path())
    }

    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from(path)
    }

    /// Loads an explicitly named config file; a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        config.milestones.normalize();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = self.to_toml()?;
        fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typecore")
            .join("config.toml")
    }

    /// Accuracy thresholds must lie in `1..=100`, WPM thresholds must be non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(&value) = self.milestones.wpm.iter().find(|&&v| v == 0) {
            return Err(ConfigError::InvalidThreshold { kind: "wpm", value });
        }
        if let Some(&value) = self
            .milestones
            .accuracy
            .iter()
            .find(|&&v| v == 0 || v > 100)
        {
            return Err(ConfigError::InvalidThreshold {
                kind: "accuracy",
                value,
            });
        }
        Ok(())
    }
}

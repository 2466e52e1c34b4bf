//! Engine configuration with TOML file support.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use trinary_crypto::SpongeKind;
use trinary_types::SecurityLevel;
use trinary_utils::LogFormat;
use trinary_work::MAX_MIN_WEIGHT_MAGNITUDE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Defaults for every command; CLI flags override individual fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trailing zero trits required of a transaction hash.
    #[serde(default = "default_min_weight_magnitude")]
    pub min_weight_magnitude: usize,

    /// Key security level, 1 to 3.
    #[serde(default)]
    pub security: SecurityLevel,

    /// Search threads; 0 uses every core.
    #[serde(default)]
    pub workers: usize,

    #[serde(default = "default_mining_iterations")]
    pub mining_iterations: u64,

    /// Weak digits tolerated by the bundle miner.
    #[serde(default)]
    pub mining_threshold: u32,

    #[serde(default)]
    pub fully_secure: bool,

    /// Sponge used for subseeds, keys, addresses and signatures.
    #[serde(default)]
    pub key_sponge: SpongeKind,

    /// Log filter, e.g. "info" or "warn,trinary_work=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_min_weight_magnitude() -> usize {
    14
}

fn default_mining_iterations() -> u64 {
    1_000_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values no search would accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_weight_magnitude > MAX_MIN_WEIGHT_MAGNITUDE {
            return Err(ConfigError::Invalid(format!(
                "min_weight_magnitude {} exceeds {MAX_MIN_WEIGHT_MAGNITUDE}",
                self.min_weight_magnitude
            )));
        }
        if self.mining_iterations == 0 {
            return Err(ConfigError::Invalid(
                "mining_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_weight_magnitude: default_min_weight_magnitude(),
            security: SecurityLevel::default(),
            workers: 0,
            mining_iterations: default_mining_iterations(),
            mining_threshold: 0,
            fully_secure: false,
            key_sponge: SpongeKind::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

//! Configuration management for MineChain

use crate::error::ChainError;
use crate::miner::MAX_DIFFICULTY;
use crate::transaction::Amount;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "minechain.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainConfig {
    /// Leading zero hex digits required of every mined block hash.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    /// Amount minted to the miner of each block.
    #[serde(default = "default_reward")]
    pub reward: Amount,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            reward: default_reward(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MinerConfig {
    /// Give up on a block after this many seconds. Unset means no deadline.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl MinerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_difficulty() -> usize {
    2
}

fn default_reward() -> Amount {
    50
}

/// Loads configuration from a TOML file. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    let config: Config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        toml::from_str(&config_str)?
    } else {
        Config::default()
    };

    // Validate critical values
    if config.chain.difficulty > MAX_DIFFICULTY {
        return Err(ChainError::ConfigError(format!(
            "chain.difficulty must be at most {}, got {}",
            MAX_DIFFICULTY, config.chain.difficulty
        )));
    }
    if config.chain.reward < 0 {
        return Err(ChainError::ConfigError(format!(
            "chain.reward must not be negative, got {}",
            config.chain.reward
        )));
    }
    if config.miner.timeout_secs == Some(0) {
        return Err(ChainError::ConfigError(
            "miner.timeout_secs must be positive when set".to_string(),
        ));
    }

    Ok(config)
}

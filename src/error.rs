//! Error types for MineChain

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Blocks may only be appended through mining.
    DirectAppendForbidden,
    InvalidDifficulty(usize),
    InvalidReward(i64),
    CryptoError(String),
    ConfigError(String),
    IoError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::DirectAppendForbidden => {
                write!(f, "Blocks cannot be added directly; mine to extend the chain")
            }
            ChainError::InvalidDifficulty(d) => write!(
                f,
                "Invalid difficulty {}: must be at most {} hex digits",
                d,
                crate::miner::MAX_DIFFICULTY
            ),
            ChainError::InvalidReward(r) => write!(f, "Invalid reward {}: must not be negative", r),
            ChainError::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;

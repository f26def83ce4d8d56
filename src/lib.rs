//! MineChain - a minimal proof-of-work ledger
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the chain, balance replay and the validators
//! - [`transaction`] - Signed value transfers and reward mints
//! - [`mempool`] - Pending-transaction queue
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work nonce search
//!
//! ## Cryptography
//! - [`crypto`] - The signing service (secp256k1) and SHA-256 hashing
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```no_run
//! use minechain::blockchain::{is_valid_mined_chain, Blockchain};
//! use minechain::crypto::{PrivateKey, Secp256k1Signer};
//!
//! let mut chain = Blockchain::new(Secp256k1Signer, 2, 50)?;
//! let miner = PrivateKey::generate();
//! let block = chain.mine(&miner);
//! assert!(block.hash.as_deref().unwrap_or_default().starts_with("00"));
//! assert!(is_valid_mined_chain(&chain));
//! # Ok::<(), minechain::error::ChainError>(())
//! ```

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

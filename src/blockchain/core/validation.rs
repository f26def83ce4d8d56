//! Chain validators.
//!
//! Two independent strategies live here:
//!
//! - the **mining validator** trusts work: it checks proof-of-work prefixes,
//!   the one-mint-per-block rule, reward amounts, and replays balances to catch
//!   double-spends. It does not look at signatures or hash links.
//! - the **integrity validator** trusts signatures: it checks that every block
//!   hash matches its contents, that blocks link to their predecessors, and
//!   that every transaction is non-negative and authentically signed.
//!
//! [`validate_full_chain`] runs both for callers that want the stricter contract.

use crate::blockchain::core::chain::{Block, Blockchain};
use crate::blockchain::core::state::{BalanceLedger, Overdraft};
use crate::crypto::{PublicKey, Signer};
use crate::transaction::Amount;
use tracing::debug;

/// Why a chain was rejected. Indices are positions in the block sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("block {index} hash does not start with {difficulty} zero digits")]
    ProofOfWork { index: usize, difficulty: usize },
    #[error("block {index} contains {count} reward transactions")]
    MultipleMints { index: usize, count: usize },
    #[error("block {index} mints {found}, but the reward is {expected}")]
    BadRewardAmount {
        index: usize,
        expected: Amount,
        found: Amount,
    },
    #[error("balance of {key} drops to {balance} in block {index}")]
    NegativeBalance {
        index: usize,
        key: PublicKey,
        balance: i128,
    },
    #[error("chain has no genesis block")]
    EmptyChain,
    #[error("block {index} has no hash")]
    MissingHash { index: usize },
    #[error("block {index} hash does not match its contents")]
    HashMismatch { index: usize },
    #[error("block {index} does not link to its predecessor")]
    BrokenLink { index: usize },
    #[error("transaction {position} in block {index} has a negative amount")]
    NegativeAmount { index: usize, position: usize },
    #[error("transaction {position} in block {index} has an invalid signature")]
    BadSignature { index: usize, position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    ProofOfWork,
    MultipleMints,
    BadRewardAmount,
    NegativeBalance,
    EmptyChain,
    MissingHash,
    HashMismatch,
    BrokenLink,
    NegativeAmount,
    BadSignature,
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::ProofOfWork { .. } => RejectionKind::ProofOfWork,
            Rejection::MultipleMints { .. } => RejectionKind::MultipleMints,
            Rejection::BadRewardAmount { .. } => RejectionKind::BadRewardAmount,
            Rejection::NegativeBalance { .. } => RejectionKind::NegativeBalance,
            Rejection::EmptyChain => RejectionKind::EmptyChain,
            Rejection::MissingHash { .. } => RejectionKind::MissingHash,
            Rejection::HashMismatch { .. } => RejectionKind::HashMismatch,
            Rejection::BrokenLink { .. } => RejectionKind::BrokenLink,
            Rejection::NegativeAmount { .. } => RejectionKind::NegativeAmount,
            Rejection::BadSignature { .. } => RejectionKind::BadSignature,
        }
    }
}

// ---------------------------------------------------------------------------
// Mining validator
// ---------------------------------------------------------------------------

/// Applies the mining rules to a block sequence.
///
/// Each rule is a pass over the whole chain, in this order: proof-of-work
/// (genesis exempt), at most one mint per block, mint amounts equal to
/// `reward`, and no balance ever negative during replay. The first failure
/// found is returned.
pub fn validate_mined_blocks(
    blocks: &[Block],
    difficulty: usize,
    reward: Amount,
) -> Result<(), Rejection> {
    for (index, block) in blocks.iter().enumerate().skip(1) {
        if !block.meets_difficulty(difficulty) {
            return Err(Rejection::ProofOfWork { index, difficulty });
        }
    }

    for (index, block) in blocks.iter().enumerate() {
        let count = block.reward_count();
        if count > 1 {
            return Err(Rejection::MultipleMints { index, count });
        }
    }

    for (index, block) in blocks.iter().enumerate() {
        if let Some(tx) = block
            .transactions
            .iter()
            .find(|tx| tx.is_reward() && tx.amount != reward)
        {
            return Err(Rejection::BadRewardAmount {
                index,
                expected: reward,
                found: tx.amount,
            });
        }
    }

    let mut ledger = BalanceLedger::new();
    for (index, block) in blocks.iter().enumerate() {
        for tx in &block.transactions {
            if let Err(Overdraft { key, balance }) = ledger.apply_transaction(tx) {
                return Err(Rejection::NegativeBalance { index, key, balance });
            }
        }
    }

    Ok(())
}

pub fn validate_mined_chain<S: Signer>(chain: &Blockchain<S>) -> Result<(), Rejection> {
    validate_mined_blocks(chain.blocks(), chain.difficulty(), chain.reward())
        .inspect_err(|rejection| debug!(%rejection, "chain failed mining validation"))
}

pub fn is_valid_mined_chain<S: Signer>(chain: &Blockchain<S>) -> bool {
    validate_mined_chain(chain).is_ok()
}

// ---------------------------------------------------------------------------
// Integrity validator
// ---------------------------------------------------------------------------

/// Checks one block in isolation: its stored hash matches its contents and
/// every transaction is non-negative and correctly signed.
pub fn validate_block<S: Signer>(signer: &S, index: usize, block: &Block) -> Result<(), Rejection> {
    if block.hash.is_none() {
        return Err(Rejection::MissingHash { index });
    }
    if !block.has_valid_hash() {
        return Err(Rejection::HashMismatch { index });
    }

    for (position, tx) in block.transactions.iter().enumerate() {
        if tx.amount < 0 {
            return Err(Rejection::NegativeAmount { index, position });
        }
        if !tx.verify_signature(signer) {
            return Err(Rejection::BadSignature { index, position });
        }
    }
    Ok(())
}

pub fn is_valid_block<S: Signer>(signer: &S, block: &Block) -> bool {
    validate_block(signer, 0, block).is_ok()
}

/// Applies the integrity rules to a block sequence: non-empty, every block
/// valid on its own, and every block linked to the hash of the one before.
/// Only the first block may have no previous hash.
pub fn validate_signed_blocks<S: Signer>(signer: &S, blocks: &[Block]) -> Result<(), Rejection> {
    if blocks.is_empty() {
        return Err(Rejection::EmptyChain);
    }

    for (index, block) in blocks.iter().enumerate() {
        validate_block(signer, index, block)?;
    }

    for (index, block) in blocks.iter().enumerate() {
        let linked = match index {
            0 => block.previous_hash.is_none(),
            _ => block.previous_hash.is_some() && block.previous_hash == blocks[index - 1].hash,
        };
        if !linked {
            return Err(Rejection::BrokenLink { index });
        }
    }

    Ok(())
}

pub fn validate_signed_chain<S: Signer>(chain: &Blockchain<S>) -> Result<(), Rejection> {
    validate_signed_blocks(chain.signer(), chain.blocks())
        .inspect_err(|rejection| debug!(%rejection, "chain failed integrity validation"))
}

pub fn is_valid_signed_chain<S: Signer>(chain: &Blockchain<S>) -> bool {
    validate_signed_chain(chain).is_ok()
}

/// Integrity rules first, then mining rules.
pub fn validate_full_chain<S: Signer>(chain: &Blockchain<S>) -> Result<(), Rejection> {
    validate_signed_chain(chain)?;
    validate_mined_chain(chain)
}

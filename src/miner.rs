//! Proof-of-work nonce search
//!
//! The search is strictly sequential: it starts from the block's current nonce
//! and increments by one per attempt, so a given transaction set, previous
//! hash and starting nonce always land on the same solution.

use crate::blockchain::Block;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// A hex-encoded SHA-256 digest has 64 characters; more zeros can never match.
pub const MAX_DIFFICULTY: usize = 64;

/// Attempts between polls of the cancellation flag.
const CANCEL_POLL_INTERVAL: u64 = 1024;

/// True iff the first `difficulty` characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}

/// Searches nonces until the block hash meets `difficulty`. Unbounded.
pub fn mine_block(mut block: Block, difficulty: usize) -> Block {
    let start_nonce = block.nonce;
    while !try_nonce(&mut block, difficulty) {}
    debug!(start_nonce, nonce = block.nonce, "nonce found");
    block
}

/// Like [`mine_block`], but gives up once `cancel` is set.
///
/// The flag is polled once per batch of attempts, so cancellation is prompt
/// but not instantaneous.
pub fn mine_block_until(mut block: Block, difficulty: usize, cancel: &AtomicBool) -> Option<Block> {
    let start_nonce = block.nonce;
    let mut attempts: u64 = 0;
    loop {
        if attempts % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            debug!(start_nonce, attempts, "nonce search cancelled");
            return None;
        }
        if try_nonce(&mut block, difficulty) {
            debug!(start_nonce, nonce = block.nonce, attempts, "nonce found");
            return Some(block);
        }
        attempts += 1;
    }
}

/// One attempt: seals the block if its current nonce solves the puzzle,
/// otherwise advances the nonce.
fn try_nonce(block: &mut Block, difficulty: usize) -> bool {
    let hash = block.compute_hash();
    if meets_difficulty(&hash, difficulty) {
        block.hash = Some(hash);
        return true;
    }
    block.nonce = block.nonce.wrapping_add(1);
    false
}

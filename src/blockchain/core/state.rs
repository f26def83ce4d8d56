use crate::crypto::PublicKey;
use crate::transaction::Transaction;
use std::collections::HashMap;

use super::chain::Block;

/// Running balance per public key, reconstructed from transaction history.
///
/// Keys start at zero the first time they are referenced. Balances are kept
/// as `i128` so that summing `i64` amounts cannot overflow in practice.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BalanceLedger {
    pub balances: HashMap<PublicKey, i128>,
}

/// A key whose balance went below zero while applying a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overdraft {
    pub key: PublicKey,
    pub balance: i128,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays every transaction in block order, then in-block order, without
    /// rejecting overdrafts.
    pub fn replay(blocks: &[Block]) -> Self {
        let mut ledger = Self::new();
        for tx in blocks.iter().flat_map(|b| &b.transactions) {
            // Overdrafts are still recorded; the validators decide what they mean.
            let _ = ledger.apply_transaction(tx);
        }
        ledger
    }

    pub fn balance(&self, key: &str) -> i128 {
        self.balances.get(key).copied().unwrap_or(0)
    }

    /// Debits `source` (if any), then credits `recipient`.
    ///
    /// The recipient is credited even when the debit overdraws the source, so
    /// the ledger always reflects the whole transaction; the overdraft is
    /// reported to the caller.
    pub fn apply_transaction(&mut self, tx: &Transaction) -> Result<(), Overdraft> {
        let amount = i128::from(tx.amount);
        let mut overdraft = None;

        if let Some(source) = &tx.source {
            let balance = self.balances.entry(source.clone()).or_insert(0);
            *balance -= amount;
            if *balance < 0 {
                overdraft = Some(Overdraft {
                    key: source.clone(),
                    balance: *balance,
                });
            }
        }
        *self.balances.entry(tx.recipient.clone()).or_insert(0) += amount;

        match overdraft {
            Some(overdraft) => Err(overdraft),
            None => Ok(()),
        }
    }
}

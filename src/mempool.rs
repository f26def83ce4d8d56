//! Pending-transaction queue awaiting the next mined block

use crate::transaction::Transaction;

/// Transactions are kept in submission order; nothing is validated on entry.
#[derive(Debug, Clone, Default)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// Drops every pending transaction once a block has absorbed them.
    pub fn clear(&mut self) {
        self.transactions.clear();
    }
}

use crate::blockchain::core::state::BalanceLedger;
use crate::config::ChainConfig;
use crate::crypto::{Secp256k1Signer, Signer};
use crate::error::ChainError;
use crate::mempool::Mempool;
use crate::miner::{self, MAX_DIFFICULTY};
use crate::transaction::{Amount, Transaction};
use sha2::{Digest, Sha256};
use std::sync::atomic::AtomicBool;
use tracing::{debug, info};

/// An ordered batch of transactions linked to its predecessor by hash.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub transactions: Vec<Transaction>,
    /// Absent only for the genesis block.
    pub previous_hash: Option<String>,
    pub nonce: u64,
    /// Absent until the block is sealed.
    pub hash: Option<String>,
}

impl Block {
    /// An unsealed candidate starting the nonce search at zero.
    pub fn new(transactions: Vec<Transaction>, previous_hash: Option<String>) -> Self {
        Block {
            transactions,
            previous_hash,
            nonce: 0,
            hash: None,
        }
    }

    /// The empty first block. It is sealed without proof-of-work.
    pub fn genesis() -> Self {
        let mut genesis = Block::new(vec![], None);
        genesis.hash = Some(genesis.compute_hash());
        genesis
    }

    pub fn compute_hash(&self) -> String {
        Self::calculate_hash(&self.transactions, self.previous_hash.as_deref(), self.nonce)
    }

    /// SHA-256 over the transactions, the previous hash and the nonce, as hex.
    pub fn calculate_hash(
        transactions: &[Transaction],
        previous_hash: Option<&str>,
        nonce: u64,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update("BLOCK:".as_bytes());
        match previous_hash {
            None => hasher.update([0u8]),
            Some(previous_hash) => {
                hasher.update([1u8]);
                hasher.update((previous_hash.len() as u64).to_le_bytes());
                hasher.update(previous_hash.as_bytes());
            }
        }
        hasher.update((transactions.len() as u64).to_le_bytes());
        for tx in transactions {
            hasher.update(tx.hash());
        }
        hasher.update(nonce.to_le_bytes());
        hex::encode(hasher.finalize())
    }

    /// True iff a hash is stored and it matches the block's current contents.
    pub fn has_valid_hash(&self) -> bool {
        match &self.hash {
            Some(hash) => *hash == self.compute_hash(),
            None => false,
        }
    }

    /// Proof-of-work check on the stored hash. An unsealed block never passes.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        self.hash
            .as_deref()
            .is_some_and(|hash| miner::meets_difficulty(hash, difficulty))
    }

    /// Number of source-less (minting) transactions in the block.
    pub fn reward_count(&self) -> usize {
        self.transactions.iter().filter(|tx| tx.is_reward()).count()
    }
}

/// A single in-memory proof-of-work chain.
///
/// The block sequence is private: the only way to extend it is [`Blockchain::mine`]
/// (or its cancellable twin). Callers that share a chain across threads must
/// serialize access themselves.
#[derive(Debug, Clone)]
pub struct Blockchain<S: Signer = Secp256k1Signer> {
    blocks: Vec<Block>,
    difficulty: usize,
    reward: Amount,
    mempool: Mempool,
    signer: S,
}

impl<S: Signer> Blockchain<S> {
    pub fn new(signer: S, difficulty: usize, reward: Amount) -> Result<Self, ChainError> {
        if difficulty > MAX_DIFFICULTY {
            return Err(ChainError::InvalidDifficulty(difficulty));
        }
        if reward < 0 {
            return Err(ChainError::InvalidReward(reward));
        }

        Ok(Blockchain {
            blocks: vec![Block::genesis()],
            difficulty,
            reward,
            mempool: Mempool::new(),
            signer,
        })
    }

    pub fn from_config(signer: S, config: &ChainConfig) -> Result<Self, ChainError> {
        Self::new(signer, config.difficulty, config.reward)
    }

    /// Blocks cannot be appended directly; this always fails.
    pub fn add_block(&mut self, _block: Block) -> Result<(), ChainError> {
        Err(ChainError::DirectAppendForbidden)
    }

    /// Queues a transaction for the next mined block. Nothing is validated here.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.mempool.add_transaction(tx);
    }

    /// Mints the reward to `private_key`'s owner, seals the pending queue into
    /// a new block and appends it. Blocks until a nonce is found.
    pub fn mine(&mut self, private_key: &S::PrivateKey) -> &Block {
        let candidate = self.candidate_block(private_key);
        let mined = miner::mine_block(candidate, self.difficulty);
        self.commit(mined)
    }

    /// [`Blockchain::mine`] with a cancellation flag.
    ///
    /// Returns `None` if `cancel` is raised before a nonce is found; the chain
    /// and its pending queue are then exactly as they were before the call.
    pub fn mine_cancellable(
        &mut self,
        private_key: &S::PrivateKey,
        cancel: &AtomicBool,
    ) -> Option<&Block> {
        let candidate = self.candidate_block(private_key);
        let mined = miner::mine_block_until(candidate, self.difficulty, cancel)?;
        Some(self.commit(mined))
    }

    fn candidate_block(&self, private_key: &S::PrivateKey) -> Block {
        let mut transactions: Vec<Transaction> = self.mempool.iter().cloned().collect();
        transactions.push(Transaction::reward(&self.signer, private_key, self.reward));
        debug!(
            height = self.blocks.len(),
            transactions = transactions.len(),
            difficulty = self.difficulty,
            "built candidate block"
        );
        Block::new(transactions, self.head().hash.clone())
    }

    fn commit(&mut self, block: Block) -> &Block {
        info!(
            height = self.blocks.len(),
            nonce = block.nonce,
            hash = block.hash.as_deref().unwrap_or_default(),
            transactions = block.transactions.len(),
            "mined block"
        );
        self.blocks.push(block);
        self.mempool.clear();
        self.head()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The most recently appended block.
    pub fn head(&self) -> &Block {
        // Genesis is always present
        &self.blocks[self.blocks.len() - 1]
    }

    /// Number of blocks after genesis.
    pub fn height(&self) -> usize {
        self.blocks.len() - 1
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn reward(&self) -> Amount {
        self.reward
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn pending_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.mempool.iter()
    }

    /// Balances from replaying every mined transaction, overdrafts included.
    pub fn balances(&self) -> BalanceLedger {
        BalanceLedger::replay(&self.blocks)
    }

    pub fn balance_of(&self, key: &str) -> i128 {
        self.balances().balance(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    fn test_chain(difficulty: usize) -> Blockchain {
        Blockchain::new(Secp256k1Signer, difficulty, 50).unwrap()
    }

    #[test]
    fn test_genesis_block() {
        let chain = test_chain(2);
        assert_eq!(chain.blocks().len(), 1);
        assert_eq!(chain.height(), 0);

        let genesis = chain.head();
        assert!(genesis.transactions.is_empty());
        assert_eq!(genesis.previous_hash, None);
        assert!(genesis.has_valid_hash());
    }

    #[test]
    fn test_rejects_unreachable_difficulty() {
        let result = Blockchain::new(Secp256k1Signer, MAX_DIFFICULTY + 1, 50);
        assert_eq!(result.unwrap_err(), ChainError::InvalidDifficulty(MAX_DIFFICULTY + 1));
        assert!(Blockchain::new(Secp256k1Signer, 2, -1).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = ChainConfig {
            difficulty: 1,
            reward: 12,
        };
        let chain = Blockchain::from_config(Secp256k1Signer, &config).unwrap();
        assert_eq!(chain.difficulty(), 1);
        assert_eq!(chain.reward(), 12);
    }

    #[test]
    fn test_add_block_is_forbidden() {
        let mut chain = test_chain(1);
        let result = chain.add_block(Block::new(vec![], chain.head().hash.clone()));
        assert_eq!(result, Err(ChainError::DirectAppendForbidden));
        assert_eq!(chain.blocks().len(), 1);
    }

    #[test]
    fn test_mine_links_and_clears_pending() {
        let mut chain = test_chain(2);
        let miner = PrivateKey::generate();
        let miner_key = Secp256k1Signer.public_key(&miner);
        let genesis_hash = chain.head().hash.clone();

        let bob = Secp256k1Signer.public_key(&PrivateKey::generate());
        chain.add_transaction(Transaction::new(&Secp256k1Signer, &miner, Some(bob), 0));
        assert_eq!(chain.pending_transactions().count(), 1);

        let block = chain.mine(&miner).clone();
        assert_eq!(block.previous_hash, genesis_hash);
        assert!(block.hash.as_deref().unwrap().starts_with("00"));
        assert!(block.has_valid_hash());
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.reward_count(), 1);
        assert_eq!(chain.pending_transactions().count(), 0);
        assert_eq!(chain.height(), 1);
        assert_eq!(chain.balance_of(&miner_key), 50);
    }

    #[test]
    fn test_cancelled_mining_leaves_chain_untouched() {
        let mut chain = Blockchain::new(Secp256k1Signer, MAX_DIFFICULTY, 50).unwrap();
        let miner = PrivateKey::generate();
        let bob = Secp256k1Signer.public_key(&PrivateKey::generate());
        let pending = Transaction::new(&Secp256k1Signer, &miner, Some(bob), 0);
        chain.add_transaction(pending.clone());

        let cancel = AtomicBool::new(true);
        assert!(chain.mine_cancellable(&miner, &cancel).is_none());
        assert_eq!(chain.blocks().len(), 1);
        assert_eq!(chain.pending_transactions().cloned().collect::<Vec<_>>(), vec![pending]);
    }

    #[test]
    fn test_mining_is_reproducible() {
        let miner = PrivateKey::generate();
        let mut first = test_chain(2);
        let mut second = test_chain(2);
        assert_eq!(first.mine(&miner), second.mine(&miner));
    }

    #[test]
    fn test_tampering_breaks_hash_integrity() {
        let mut chain = test_chain(1);
        let miner = PrivateKey::generate();
        let block = chain.mine(&miner).clone();

        let mut tampered = block.clone();
        tampered.nonce += 1;
        assert!(!tampered.has_valid_hash());

        let mut tampered = block.clone();
        tampered.previous_hash = None;
        assert!(!tampered.has_valid_hash());

        let mut tampered = block.clone();
        tampered.transactions[0].amount += 1;
        assert!(!tampered.has_valid_hash());

        let mut tampered = block;
        tampered.hash = None;
        assert!(!tampered.has_valid_hash());
        assert!(!tampered.meets_difficulty(0));
    }
}

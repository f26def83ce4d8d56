/// Transaction types for MineChain
use crate::crypto::{PublicKey, Signer};
use sha2::{Digest, Sha256};

/// Value carried by a transaction. Signed so that negative amounts can be
/// represented and rejected by validation rather than by construction.
pub type Amount = i64;

/// A signed value transfer, or a reward mint when `source` is absent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub source: Option<PublicKey>,
    pub recipient: PublicKey,
    pub amount: Amount,
    #[serde(with = "hex")]
    pub signature: Vec<u8>,
}

impl Transaction {
    /// Creates and signs a transaction.
    ///
    /// With `recipient = None` this is a reward mint: the signer's own key
    /// becomes the recipient and `source` stays absent. No range checks happen
    /// here; amounts are judged by the chain validators.
    pub fn new<S: Signer>(
        signer: &S,
        private_key: &S::PrivateKey,
        recipient: Option<PublicKey>,
        amount: Amount,
    ) -> Self {
        let own_key = signer.public_key(private_key);
        let (source, recipient) = match recipient {
            Some(recipient) => (Some(own_key), recipient),
            None => (None, own_key),
        };

        let message = signable_message(source.as_deref(), &recipient, amount);
        let signature = signer.sign(private_key, &message);
        Transaction {
            source,
            recipient,
            amount,
            signature,
        }
    }

    /// Mints `amount` to the holder of `private_key`.
    pub fn reward<S: Signer>(signer: &S, private_key: &S::PrivateKey, amount: Amount) -> Self {
        Self::new(signer, private_key, None, amount)
    }

    pub fn is_reward(&self) -> bool {
        self.source.is_none()
    }

    /// The key expected to have produced `signature`: the sender, or the
    /// miner for a reward.
    pub fn signing_key(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.recipient)
    }

    pub fn signable_message(&self) -> Vec<u8> {
        signable_message(self.source.as_deref(), &self.recipient, self.amount)
    }

    /// Calculate the hash of this transaction, signature included
    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.signable_message());
        hasher.update((self.signature.len() as u64).to_le_bytes());
        hasher.update(&self.signature);
        hasher.finalize().into()
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.hash())
    }
}

fn signable_message(source: Option<&str>, recipient: &str, amount: Amount) -> Vec<u8> {
    let mut message = Vec::new();
    message.extend_from_slice("TX:".as_bytes());
    match source {
        // A tag byte keeps an absent source distinct from every key string
        None => message.push(0),
        Some(source) => {
            message.push(1);
            push_len_prefixed(&mut message, source.as_bytes());
        }
    }
    push_len_prefixed(&mut message, recipient.as_bytes());
    message.extend_from_slice(&amount.to_le_bytes());
    message
}

fn push_len_prefixed(message: &mut Vec<u8>, bytes: &[u8]) {
    message.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    message.extend_from_slice(bytes);
}

//! Transaction module split into types and validation for better modularity

pub mod types;
pub mod validation;

pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{PrivateKey, Secp256k1Signer, Signer};

    #[test]
    fn test_transfer_construction() {
        let signer = Secp256k1Signer;
        let alice = PrivateKey::generate();
        let bob = signer.public_key(&PrivateKey::generate());

        let tx = Transaction::new(&signer, &alice, Some(bob.clone()), 25);
        assert_eq!(tx.source, Some(signer.public_key(&alice)));
        assert_eq!(tx.recipient, bob);
        assert_eq!(tx.amount, 25);
        assert!(!tx.is_reward());
        assert!(tx.is_valid_transaction(&signer));
    }

    #[test]
    fn test_reward_is_signed_by_recipient() {
        let signer = Secp256k1Signer;
        let miner = PrivateKey::generate();

        let tx = Transaction::reward(&signer, &miner, 50);
        assert!(tx.is_reward());
        assert_eq!(tx.source, None);
        assert_eq!(tx.recipient, signer.public_key(&miner));
        assert_eq!(tx.signing_key(), tx.recipient);
        assert!(tx.verify_signature(&signer));
    }

    #[test]
    fn test_tampered_amount_fails_verification() {
        let signer = Secp256k1Signer;
        let alice = PrivateKey::generate();
        let bob = signer.public_key(&PrivateKey::generate());

        let mut tx = Transaction::new(&signer, &alice, Some(bob), 10);
        tx.amount = 1_000;
        assert!(!tx.verify_signature(&signer));
    }

    #[test]
    fn test_stolen_signature_fails_verification() {
        let signer = Secp256k1Signer;
        let alice = PrivateKey::generate();
        let mallory = PrivateKey::generate();
        let bob = signer.public_key(&PrivateKey::generate());

        // Mallory re-labels her own signed transfer as coming from Alice
        let mut tx = Transaction::new(&signer, &mallory, Some(bob), 10);
        tx.source = Some(signer.public_key(&alice));
        assert!(!tx.is_valid_transaction(&signer));
    }

    #[test]
    fn test_negative_amount_is_constructible_but_invalid() {
        let signer = Secp256k1Signer;
        let alice = PrivateKey::generate();
        let bob = signer.public_key(&PrivateKey::generate());

        let tx = Transaction::new(&signer, &alice, Some(bob), -5);
        assert!(tx.verify_signature(&signer));
        assert!(!tx.is_valid_transaction(&signer));
    }

    #[test]
    fn test_absent_source_serializes_distinctly() {
        let signer = Secp256k1Signer;
        let miner = PrivateKey::generate();
        let own_key = signer.public_key(&miner);

        let reward = Transaction::reward(&signer, &miner, 7);
        let self_send = Transaction::new(&signer, &miner, Some(own_key), 7);
        assert_ne!(reward.signable_message(), self_send.signable_message());
        assert_ne!(reward.hash(), self_send.hash());
    }

    #[test]
    fn test_hash_covers_signature() {
        let signer = Secp256k1Signer;
        let miner = PrivateKey::generate();
        let mut tx = Transaction::reward(&signer, &miner, 50);
        let original = tx.hash_str();
        tx.signature[0] ^= 0xff;
        assert_ne!(original, tx.hash_str());
        assert_eq!(original.len(), 64);
    }

    #[test]
    fn test_json_roundtrip_keeps_hex_signature() {
        let signer = Secp256k1Signer;
        let miner = PrivateKey::generate();
        let tx = Transaction::reward(&signer, &miner, 50);

        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains(&hex::encode(&tx.signature)));
        assert!(json.contains("\"source\":null"));
        let decoded: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, tx);
    }
}

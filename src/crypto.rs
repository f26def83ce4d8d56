//! Cryptographic primitives for MineChain
//!
//! The ledger core only needs a signing service: derive a public key, sign a
//! byte string, verify a detached signature. [`Signer`] is that seam, and
//! [`Secp256k1Signer`] is the implementation the chain uses by default.

use crate::error::ChainError;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};
use std::fmt;

/// A thread-safe, lazily initialized Secp256k1 context.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Hex encoding of a compressed public key. Balances are keyed by this string.
pub type PublicKey = String;

/// Signing service consumed by transactions and the chain.
///
/// Key and signature encodings belong to the implementation; the ledger only
/// relies on `sign` and `verify` agreeing with each other.
pub trait Signer {
    type PrivateKey;

    fn public_key(&self, private_key: &Self::PrivateKey) -> PublicKey;

    fn sign(&self, private_key: &Self::PrivateKey, message: &[u8]) -> Vec<u8>;

    fn verify(&self, public_key: &str, message: &[u8], signature: &[u8]) -> bool;
}

/// SHA-256 of `data`, rendered as 64 lower-case hex characters.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// A secp256k1 secret key.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(SecretKey);

impl PrivateKey {
    /// Generates a new random key using the OS random number generator.
    pub fn generate() -> Self {
        PrivateKey(SecretKey::new(&mut OsRng))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                ChainError::CryptoError(format!(
                    "Secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                ChainError::CryptoError(format!("Invalid secret key bytes: {}", e))
            }
        })?;
        Ok(PrivateKey(secret_key))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, ChainError> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| ChainError::CryptoError(format!("Invalid hex secret key: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.secret_bytes())
    }

    fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        Secp256k1PublicKey::from_secret_key(&SECP256K1_CONTEXT, &self.0).serialize()
    }
}

// Never print secret material.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// ECDSA over secp256k1 with SHA-256 message digests and compact signatures.
///
/// Signing is deterministic (RFC 6979), so the same key and message always
/// produce the same signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Signer;

impl Signer for Secp256k1Signer {
    type PrivateKey = PrivateKey;

    fn public_key(&self, private_key: &PrivateKey) -> PublicKey {
        hex::encode(private_key.public_key_bytes())
    }

    fn sign(&self, private_key: &PrivateKey, message: &[u8]) -> Vec<u8> {
        let digest: [u8; 32] = Sha256::digest(message).into();
        let message = Message::from_digest(digest);
        SECP256K1_CONTEXT
            .sign_ecdsa(&message, &private_key.0)
            .serialize_compact()
            .to_vec()
    }

    fn verify(&self, public_key: &str, message: &[u8], signature: &[u8]) -> bool {
        match hex::decode(public_key) {
            Ok(public_key_bytes) => {
                verify_signature(&public_key_bytes, message, signature).is_ok()
            }
            Err(_) => false,
        }
    }
}

/// Verifies an ECDSA signature given the raw public key bytes, message, and signature bytes.
pub fn verify_signature(
    public_key_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), ChainError> {
    if public_key_bytes.len() != PUBLIC_KEY_SIZE {
        return Err(ChainError::CryptoError(format!(
            "Public key must be exactly {} bytes (compressed), got {}",
            PUBLIC_KEY_SIZE,
            public_key_bytes.len()
        )));
    }
    if signature_bytes.len() != COMPACT_SIGNATURE_SIZE {
        return Err(ChainError::CryptoError(format!(
            "Signature must be exactly {} bytes (compact), got {}",
            COMPACT_SIGNATURE_SIZE,
            signature_bytes.len()
        )));
    }

    let public_key = Secp256k1PublicKey::from_slice(public_key_bytes)
        .map_err(|e| ChainError::CryptoError(format!("Invalid public key: {}", e)))?;

    let digest: [u8; 32] = Sha256::digest(message).into();
    let message = Message::from_digest(digest);

    let signature = Signature::from_compact(signature_bytes)
        .map_err(|e| ChainError::CryptoError(format!("Invalid signature: {}", e)))?;

    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, &public_key)
        .map_err(|_| ChainError::CryptoError("Signature verification failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_derivation() {
        let key = PrivateKey::generate();
        let public_key = Secp256k1Signer.public_key(&key);
        // Compressed key, hex encoded
        assert_eq!(public_key.len(), PUBLIC_KEY_SIZE * 2);
        assert_eq!(public_key, Secp256k1Signer.public_key(&key));
    }

    #[test]
    fn test_signing_and_verification() {
        let key = PrivateKey::generate();
        let public_key = Secp256k1Signer.public_key(&key);
        let message = b"Hello, MineChain!";

        let signature = Secp256k1Signer.sign(&key, message);
        assert_eq!(signature.len(), COMPACT_SIGNATURE_SIZE);
        assert!(Secp256k1Signer.verify(&public_key, message, &signature));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key = PrivateKey::generate();
        let first = Secp256k1Signer.sign(&key, b"same message");
        let second = Secp256k1Signer.sign(&key, b"same message");
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrong_key_fails() {
        let alice = PrivateKey::generate();
        let bob = PrivateKey::generate();
        let signature = Secp256k1Signer.sign(&alice, b"Test message");

        let bob_public = hex::decode(Secp256k1Signer.public_key(&bob)).unwrap();
        let result = verify_signature(&bob_public, b"Test message", &signature);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Cryptographic error: Signature verification failed"
        );
    }

    #[test]
    fn test_tampered_message() {
        let key = PrivateKey::generate();
        let public_key = Secp256k1Signer.public_key(&key);
        let signature = Secp256k1Signer.sign(&key, b"Original message");
        assert!(!Secp256k1Signer.verify(&public_key, b"Tampered message", &signature));
    }

    #[test]
    fn test_invalid_key_or_sig_length_check() {
        let key = PrivateKey::generate();
        let signature = Secp256k1Signer.sign(&key, b"Test");
        let public_key = hex::decode(Secp256k1Signer.public_key(&key)).unwrap();

        let result = verify_signature(&public_key[1..], b"Test", &signature);
        assert!(result.unwrap_err().to_string().contains("Public key must be exactly"));

        let result = verify_signature(&public_key, b"Test", &signature[1..]);
        assert!(result.unwrap_err().to_string().contains("Signature must be exactly"));

        assert!(!Secp256k1Signer.verify("not hex", b"Test", &signature));
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let key = PrivateKey::generate();
        let restored = PrivateKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key, restored);
        assert_eq!(format!("{:?}", key), "PrivateKey(..)");
    }

    #[test]
    fn test_from_bytes_invalid_length() {
        let short_bytes = [1u8; SECRET_KEY_SIZE - 1];
        let result = PrivateKey::from_bytes(&short_bytes);
        assert!(result.unwrap_err().to_string().contains("Secret key must be"));
        assert!(PrivateKey::from_hex("zz").is_err());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

/// Signature checks for transactions, separated from type definitions
use crate::crypto::Signer;
use crate::transaction::types::Transaction;

impl Transaction {
    /// Checks the signature against `source`, or against `recipient` for a
    /// reward transaction.
    pub fn verify_signature<S: Signer>(&self, signer: &S) -> bool {
        signer.verify(self.signing_key(), &self.signable_message(), &self.signature)
    }

    /// Stateless validity: a non-negative amount carrying an authentic signature.
    pub fn is_valid_transaction<S: Signer>(&self, signer: &S) -> bool {
        self.amount >= 0 && self.verify_signature(signer)
    }
}

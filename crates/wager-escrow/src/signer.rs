//! Ed25519 signing and verification of ledger receipts.

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use wager_types::{LedgerEvent, Receipt, Result, WagerError};

/// Holds the ledger's signing key and issues [`Receipt`]s.
pub struct ReceiptSigner {
    key: SigningKey,
}

impl ReceiptSigner {
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        Self::new(SigningKey::from_bytes(&rand::random::<[u8; 32]>()))
    }

    /// Public key that verifies this signer's receipts.
    #[must_use]
    pub fn issuer(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Serialize, hash and sign `event`.
    pub fn issue(&self, event: &LedgerEvent, issued_at: DateTime<Utc>) -> Result<Receipt> {
        let payload = serde_json::to_vec(event)?;
        let payload_hash = Receipt::hash_payload(&payload);
        let signature = self.key.sign(&payload_hash);
        Ok(Receipt {
            receipt_type: event.receipt_type(),
            game_id: event.game_id(),
            payload,
            payload_hash,
            signature: signature.to_bytes().to_vec(),
            issuer: self.issuer(),
            issued_at,
        })
    }
}

impl std::fmt::Debug for ReceiptSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptSigner")
            .field("issuer", &hex::encode(self.issuer()))
            .finish_non_exhaustive()
    }
}

/// Check a receipt's payload hash and signature against its issuer key.
///
/// # Errors
/// Returns [`WagerError::InvalidSignature`] on any mismatch.
pub fn verify_receipt(receipt: &Receipt) -> Result<()> {
    if !receipt.payload_intact() {
        return Err(WagerError::InvalidSignature);
    }
    let key =
        VerifyingKey::from_bytes(&receipt.issuer).map_err(|_| WagerError::InvalidSignature)?;
    let signature =
        Signature::from_slice(&receipt.signature).map_err(|_| WagerError::InvalidSignature)?;
    key.verify(receipt.signing_bytes(), &signature)
        .map_err(|_| WagerError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wager_types::{GameId, Principal, ReceiptType};

    fn event() -> LedgerEvent {
        LedgerEvent::GameJoined {
            game_id: GameId(3),
            opponent: Principal::new(),
        }
    }

    #[test]
    fn issued_receipt_verifies() {
        let signer = ReceiptSigner::generate();
        let receipt = signer.issue(&event(), Utc::now()).unwrap();
        assert_eq!(receipt.receipt_type, ReceiptType::GameJoined);
        assert_eq!(receipt.game_id, Some(GameId(3)));
        assert_eq!(receipt.issuer, signer.issuer());
        verify_receipt(&receipt).unwrap();
    }

    #[test]
    fn tampered_payload_rejected() {
        let signer = ReceiptSigner::generate();
        let mut receipt = signer.issue(&event(), Utc::now()).unwrap();
        receipt.payload.push(b' ');
        assert!(matches!(
            verify_receipt(&receipt).unwrap_err(),
            WagerError::InvalidSignature
        ));
    }

    #[test]
    fn foreign_issuer_rejected() {
        let signer = ReceiptSigner::generate();
        let mut receipt = signer.issue(&event(), Utc::now()).unwrap();
        receipt.issuer = ReceiptSigner::generate().issuer();
        assert!(verify_receipt(&receipt).is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let signer = ReceiptSigner::new(SigningKey::from_bytes(&[5u8; 32]));
        let rendered = format!("{signer:?}");
        assert!(rendered.contains(&hex::encode(signer.issuer())));
        assert!(!rendered.contains(&hex::encode([5u8; 32])));
    }
}

//! Detached Ed25519 signatures.

use ed25519_dalek::VerifyingKey;

use crate::constants::SIGNATURE_LEN;
use crate::error::SolError;
use crate::pubkey::Pubkey;

/// A 64-byte detached signature. The first signature of a transaction, in
/// Base58, is the transaction id used by confirmation tracking.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl_base58_newtype!(Signature, SIGNATURE_LEN, SolError::InvalidSignature);

impl Default for Signature {
    /// The all-zero placeholder written into unsigned signature slots.
    fn default() -> Self {
        Self([0u8; SIGNATURE_LEN])
    }
}

impl Signature {
    /// True for the all-zero placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Check this signature over `message` against `pubkey` (strict
    /// verification: small-order keys and malleable signatures fail).
    pub fn verify(&self, pubkey: &Pubkey, message: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(pubkey.as_array()) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(&self.0);
        verifying_key.verify_strict(message, &signature).is_ok()
    }
}

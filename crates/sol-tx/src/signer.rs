//! The signing seam.
//!
//! Anything able to produce a detached Ed25519 signature for a known
//! address can sign a transaction: an in-memory [`Keypair`](crate::Keypair),
//! a hardware wallet, a remote KMS.

use crate::error::SolError;
use crate::pubkey::Pubkey;
use crate::signature::Signature;

pub trait Signer {
    /// Address whose signature slot this signer fills.
    fn pubkey(&self) -> Pubkey;

    /// Sign the exact serialized message bytes. Must be deterministic and
    /// free of side effects; failures are passed through unchanged.
    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SolError>;
}

impl<T: Signer + ?Sized> Signer for &T {
    fn pubkey(&self) -> Pubkey {
        (**self).pubkey()
    }

    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SolError> {
        (**self).try_sign_message(message)
    }
}

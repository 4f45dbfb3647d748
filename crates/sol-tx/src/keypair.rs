//! In-memory Ed25519 keypairs.
//!
//! The 64-byte secret key format is `seed(32) || public_key(32)`, the layout
//! wallets export as Base58. Secret material is wiped on drop: the inner
//! `ed25519_dalek::SigningKey` zeroizes itself, and every intermediate copy
//! made here goes through `zeroize`.

use std::fmt;

use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;
use zeroize::{Zeroize, Zeroizing};

use crate::error::SolError;
use crate::pubkey::Pubkey;
use crate::signature::Signature;
use crate::signer::Signer;

pub struct Keypair(SigningKey);

impl Keypair {
    /// Fresh keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    /// Build from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut seed = *seed;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self(signing_key)
    }

    /// Build from the 64-byte `seed || public_key` form. The embedded public
    /// key must match the one derived from the seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let mut keypair_bytes: [u8; 64] = bytes.try_into().map_err(|_| {
            SolError::InvalidKey(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        let result = SigningKey::from_keypair_bytes(&keypair_bytes);
        keypair_bytes.zeroize();
        result
            .map(Self)
            .map_err(|e| SolError::InvalidKey(format!("public key mismatch: {e}")))
    }

    /// Build from the Base58 text of the 64-byte secret key.
    pub fn from_base58_string(secret: &str) -> Result<Self, SolError> {
        let bytes = Zeroizing::new(
            bs58::decode(secret)
                .into_vec()
                .map_err(|e| SolError::InvalidKey(format!("base58 decode failed: {e}")))?,
        );
        Self::from_bytes(&bytes)
    }

    /// The 64-byte `seed || public_key` form, wiped when dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.0.to_keypair_bytes())
    }

    /// Base58 text of [`Keypair::to_bytes`], wiped when dropped.
    pub fn to_base58_string(&self) -> Zeroizing<String> {
        let bytes = self.to_bytes();
        Zeroizing::new(bs58::encode(&bytes[..]).into_string())
    }
}

impl Signer for Keypair {
    fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.0.verifying_key().to_bytes())
    }

    fn try_sign_message(&self, message: &[u8]) -> Result<Signature, SolError> {
        let signature = self.0.try_sign(message)?;
        Ok(Signature::new_from_array(signature.to_bytes()))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

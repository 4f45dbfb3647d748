//! Account addresses.
//!
//! An address is a raw 32-byte Ed25519 public key, or an off-curve
//! program-derived address. Its text form is plain Base58 (no hashing, no
//! checksum), so the bytes ARE the address.

use sha2::{Digest, Sha256};

use crate::constants::{MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER, PUBKEY_LEN};
use crate::error::SolError;

/// A 32-byte account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; PUBKEY_LEN]);

impl_base58_newtype!(Pubkey, PUBKEY_LEN, SolError::InvalidAddress);

impl Pubkey {
    /// Whether the bytes decompress to a point on the Ed25519 curve.
    ///
    /// Wallet keys are on the curve; program-derived addresses never are.
    pub fn is_on_curve(&self) -> bool {
        curve25519_dalek::edwards::CompressedEdwardsY(self.0)
            .decompress()
            .is_some()
    }

    /// Derive a program address from `seeds` (bump included by the caller).
    ///
    /// Fails if the seeds are out of bounds or the result lands on the curve.
    pub fn create_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<Pubkey, SolError> {
        check_seeds(seeds, MAX_SEEDS)?;
        try_create_program_address(seeds, program_id).ok_or_else(|| {
            SolError::InvalidAddress("derived address lies on the ed25519 curve".into())
        })
    }

    /// Find the first off-curve program address, trying bump seeds from 255
    /// down to 0. Returns the address and the bump that produced it.
    pub fn find_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<(Pubkey, u8), SolError> {
        check_seeds(seeds, MAX_SEEDS - 1)?;

        for bump in (0u8..=255).rev() {
            let bump_seed = [bump];
            let mut with_bump: Vec<&[u8]> = seeds.to_vec();
            with_bump.push(&bump_seed);
            if let Some(address) = try_create_program_address(&with_bump, program_id) {
                return Ok((address, bump));
            }
        }

        Err(SolError::InvalidAddress(
            "could not find valid program address bump seed".into(),
        ))
    }

    /// Derive `SHA-256(base || seed || owner)`, the address used by
    /// `*WithSeed` system instructions.
    pub fn create_with_seed(base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<Pubkey, SolError> {
        if seed.len() > MAX_SEED_LEN {
            return Err(SolError::InvalidAddress(format!(
                "seed of {} bytes exceeds {MAX_SEED_LEN}",
                seed.len()
            )));
        }
        if owner.0.ends_with(PDA_MARKER) {
            return Err(SolError::InvalidAddress(
                "owner may not end with the program address marker".into(),
            ));
        }

        let mut hasher = Sha256::new();
        hasher.update(base.0);
        hasher.update(seed.as_bytes());
        hasher.update(owner.0);
        Ok(Pubkey(hasher.finalize().into()))
    }
}

fn check_seeds(seeds: &[&[u8]], max_seeds: usize) -> Result<(), SolError> {
    if seeds.len() > max_seeds {
        return Err(SolError::InvalidAddress(format!(
            "at most {max_seeds} seeds allowed, got {}",
            seeds.len()
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(SolError::InvalidAddress(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    Ok(())
}

/// `SHA-256(seed_0 || ... || seed_n || program_id || "ProgramDerivedAddress")`,
/// or `None` when the hash is a valid curve point (try the next bump).
fn try_create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Option<Pubkey> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.0);
    hasher.update(PDA_MARKER);

    let address = Pubkey(hasher.finalize().into());
    if address.is_on_curve() {
        return None;
    }
    Some(address)
}

//! Recent blockhash values.

use crate::constants::HASH_LEN;
use crate::error::SolError;

/// A 32-byte blockhash identifying a recent ledger state. Every message
/// embeds one as a replay-protection nonce.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hash([u8; HASH_LEN]);

impl_base58_newtype!(Hash, HASH_LEN, SolError::InvalidHash);

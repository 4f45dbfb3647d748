//! Protocol constants shared by the message and transaction codecs.

/// Length of an account address in bytes.
pub const PUBKEY_LEN: usize = 32;

/// Length of a blockhash in bytes.
pub const HASH_LEN: usize = 32;

/// Length of a detached Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Account indices are single bytes, so a message can address at most 256 keys.
pub const MAX_ACCOUNT_KEYS: usize = 256;

/// Maximum serialized transaction size accepted by the network (IPv6 MTU
/// minus headers).
pub const PACKET_DATA_SIZE: usize = 1280 - 40 - 8;

/// High bit marking a versioned transaction; the low seven bits carry the
/// message version.
pub const VERSION_PREFIX: u8 = 0x80;

/// Highest message version that fits under [`VERSION_PREFIX`].
pub const MAX_MESSAGE_VERSION: u8 = 0x7f;

/// Longest seed accepted by program address derivation.
pub const MAX_SEED_LEN: usize = 32;

/// Most seeds accepted by program address derivation (bump included).
pub const MAX_SEEDS: usize = 16;

/// Marker hashed into every program-derived address.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

//! Client-side construction of Solana-style transactions.
//!
//! This crate builds, signs and serializes transactions entirely by hand: no
//! RPC client, no runtime, just the compact binary wire format. Instructions
//! go in, account keys are deduplicated and ordered, instructions are compiled
//! against the final key indices, and the signed bytes come out ready for
//! `sendTransaction`.
//!
//! Two message shapes are supported:
//!
//! - [`LegacyMessage`], built through [`LegacyMessageBuilder`] or
//!   [`Transaction`]: keys sorted by signer/writable class with the fee payer
//!   first.
//! - [`VersionedMessage`], signed through [`VersionedTransaction`]: keys in
//!   first-seen order plus [`AddressTableLookup`] references.
//!
//! Ed25519 comes from `ed25519-dalek` and Base58 from `bs58`.

#[macro_use]
mod macros;

pub mod account;
pub mod account_table;
pub mod constants;
pub mod error;
pub mod hash;
pub mod instruction;
pub mod keypair;
pub mod message;
pub mod pubkey;
mod reader;
pub mod short_vec;
pub mod signature;
pub mod signer;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use account::AccountMeta;
pub use account_table::{AccountOrdering, AccountTable};
pub use error::SolError;
pub use hash::Hash;
pub use instruction::{CompiledInstruction, Instruction};
pub use keypair::Keypair;
pub use message::{
    AddressTableLookup, LegacyMessage, LegacyMessageBuilder, MessageHeader, VersionedMessage,
};
pub use pubkey::Pubkey;
pub use signature::Signature;
pub use signer::Signer;
pub use transaction::{Transaction, VersionedTransaction};

//! Message formats: the canonical bytes every signature covers.
//!
//! ```text
//! Legacy message:
//!   header                  3 bytes (see MessageHeader)
//!   num_accounts            short_vec
//!   account_keys            32 bytes * num_accounts
//!   recent_blockhash        32 bytes
//!   num_instructions        short_vec
//!   instructions[]          CompiledInstruction
//!
//! Versioned (v0) message: the legacy layout, followed by
//!   num_lookups             short_vec
//!   lookups[]               AddressTableLookup
//! ```

mod legacy;
mod lookup;
mod v0;

pub use legacy::{LegacyMessage, LegacyMessageBuilder};
pub use lookup::AddressTableLookup;
pub use v0::VersionedMessage;

use crate::account::AccountMeta;
use crate::error::SolError;
use crate::reader::ByteReader;

/// Three-byte prefix describing how the key list splits into permission
/// classes. Keys are laid out signers first; inside each of the signer and
/// non-signer groups the read-only keys come last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

impl MessageHeader {
    pub const LEN: usize = 3;

    /// Count the classes of an already ordered key list in one pass.
    ///
    /// A list of 256 keys can still hold 256 signers or 256 read-only
    /// non-signers, which no header byte can describe.
    pub(crate) fn from_accounts(accounts: &[AccountMeta]) -> Result<Self, SolError> {
        let (mut signers, mut readonly_signed, mut readonly_unsigned) = (0usize, 0usize, 0usize);
        for meta in accounts {
            match (meta.is_signer, meta.is_writable) {
                (true, true) => signers += 1,
                (true, false) => {
                    signers += 1;
                    readonly_signed += 1;
                }
                (false, true) => {}
                (false, false) => readonly_unsigned += 1,
            }
        }
        Ok(Self {
            num_required_signatures: header_count(signers, accounts.len())?,
            num_readonly_signed_accounts: header_count(readonly_signed, accounts.len())?,
            num_readonly_unsigned_accounts: header_count(readonly_unsigned, accounts.len())?,
        })
    }

    pub(crate) fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.num_required_signatures);
        buf.push(self.num_readonly_signed_accounts);
        buf.push(self.num_readonly_unsigned_accounts);
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, SolError> {
        Ok(Self {
            num_required_signatures: reader.read_u8("message header")?,
            num_readonly_signed_accounts: reader.read_u8("message header")?,
            num_readonly_unsigned_accounts: reader.read_u8("message header")?,
        })
    }

    /// Reject headers that cannot describe `num_keys` keys.
    pub(crate) fn check_against(&self, num_keys: usize) -> Result<(), SolError> {
        let signers = self.num_required_signatures as usize;
        let readonly_signed = self.num_readonly_signed_accounts as usize;
        let readonly_unsigned = self.num_readonly_unsigned_accounts as usize;

        if signers > num_keys {
            return Err(SolError::Serialization(format!(
                "header requires {signers} signatures but message has {num_keys} keys"
            )));
        }
        if readonly_signed > signers {
            return Err(SolError::Serialization(format!(
                "{readonly_signed} read-only signers exceed {signers} signers"
            )));
        }
        if readonly_unsigned > num_keys - signers {
            return Err(SolError::Serialization(format!(
                "{readonly_unsigned} read-only non-signers exceed {} non-signers",
                num_keys - signers
            )));
        }
        Ok(())
    }

    /// Signer bit of key `index` in a list described by this header.
    pub fn is_signer(&self, index: usize) -> bool {
        index < self.num_required_signatures as usize
    }

    /// Writable bit of key `index` in a list of `num_keys` keys.
    pub fn is_writable(&self, index: usize, num_keys: usize) -> bool {
        let signers = self.num_required_signatures as usize;
        if index < signers {
            index < signers.saturating_sub(self.num_readonly_signed_accounts as usize)
        } else {
            index < num_keys.saturating_sub(self.num_readonly_unsigned_accounts as usize)
        }
    }
}

/// Narrow a class count to its header byte.
pub(crate) fn header_count(count: usize, num_keys: usize) -> Result<u8, SolError> {
    u8::try_from(count).map_err(|_| SolError::TooManyAccounts(num_keys))
}

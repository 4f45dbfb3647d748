use crate::constants::PUBKEY_LEN;
use crate::error::SolError;
use crate::pubkey::Pubkey;
use crate::reader::ByteReader;
use crate::short_vec;

/// Reference to an on-chain address lookup table.
///
/// The indexes select entries of that table's own address list, never of the
/// message's `account_keys`; the network resolves them at execution time.
///
/// ```text
/// account_key        32 bytes
/// num_writable       short_vec
/// writable_indexes   u8 * num_writable
/// num_readonly       short_vec
/// readonly_indexes   u8 * num_readonly
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTableLookup {
    pub account_key: Pubkey,
    pub writable_indexes: Vec<u8>,
    pub readonly_indexes: Vec<u8>,
}

impl AddressTableLookup {
    /// Build from unchecked indexes; each must fit in a byte.
    pub fn new(
        account_key: Pubkey,
        writable_indexes: &[usize],
        readonly_indexes: &[usize],
    ) -> Result<Self, SolError> {
        Ok(Self {
            account_key,
            writable_indexes: to_table_indexes(writable_indexes)?,
            readonly_indexes: to_table_indexes(readonly_indexes)?,
        })
    }

    pub fn from_indexes(
        account_key: Pubkey,
        writable_indexes: Vec<u8>,
        readonly_indexes: Vec<u8>,
    ) -> Self {
        Self {
            account_key,
            writable_indexes,
            readonly_indexes,
        }
    }

    /// Accounts this lookup adds to the transaction.
    pub fn loaded_len(&self) -> usize {
        self.writable_indexes.len() + self.readonly_indexes.len()
    }

    pub fn serialized_len(&self) -> usize {
        PUBKEY_LEN
            + short_vec::encoded_len(self.writable_indexes.len())
            + self.writable_indexes.len()
            + short_vec::encoded_len(self.readonly_indexes.len())
            + self.readonly_indexes.len()
    }

    pub(crate) fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.account_key.as_ref());
        short_vec::write_length(buf, self.writable_indexes.len());
        buf.extend_from_slice(&self.writable_indexes);
        short_vec::write_length(buf, self.readonly_indexes.len());
        buf.extend_from_slice(&self.readonly_indexes);
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, SolError> {
        let account_key = Pubkey::new_from_array(reader.read_array("lookup table address")?);
        let num_writable = reader.read_bounded_length(1, "writable lookup indexes")?;
        let writable_indexes = reader
            .read_slice(num_writable, "writable lookup indexes")?
            .to_vec();
        let num_readonly = reader.read_bounded_length(1, "readonly lookup indexes")?;
        let readonly_indexes = reader
            .read_slice(num_readonly, "readonly lookup indexes")?
            .to_vec();
        Ok(Self {
            account_key,
            writable_indexes,
            readonly_indexes,
        })
    }
}

fn to_table_indexes(indexes: &[usize]) -> Result<Vec<u8>, SolError> {
    indexes
        .iter()
        .map(|&index| u8::try_from(index).map_err(|_| SolError::LookupIndexOutOfRange(index)))
        .collect()
}

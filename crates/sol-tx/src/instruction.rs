//! Instructions before and after compilation against a key list.

use crate::account::AccountMeta;
use crate::error::SolError;
use crate::pubkey::Pubkey;
use crate::reader::ByteReader;
use crate::short_vec;

// ---------------------------------------------------------------------------
// Instruction
// ---------------------------------------------------------------------------

/// One call into a program: target program, the accounts it touches (in the
/// order the program expects them), and opaque payload bytes.
///
/// Immutable once built. The payload is owned, so later changes to the
/// caller's buffer never reach a stored instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    program_id: Pubkey,
    accounts: Vec<AccountMeta>,
    data: Vec<u8>,
}

impl Instruction {
    pub fn new(program_id: Pubkey, accounts: Vec<AccountMeta>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            program_id,
            accounts,
            data: data.into(),
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn accounts(&self) -> &[AccountMeta] {
        &self.accounts
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

// ---------------------------------------------------------------------------
// CompiledInstruction
// ---------------------------------------------------------------------------

/// An instruction whose program and accounts are replaced by u8 indices into
/// a message's `account_keys`.
///
/// ```text
/// program_id_index   u8
/// num_accounts       short_vec
/// account_indices    u8 * num_accounts
/// data_len           short_vec
/// data               u8 * data_len
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

impl CompiledInstruction {
    pub fn serialized_len(&self) -> usize {
        1 + short_vec::encoded_len(self.accounts.len())
            + self.accounts.len()
            + short_vec::encoded_len(self.data.len())
            + self.data.len()
    }

    pub(crate) fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.program_id_index);
        short_vec::write_length(buf, self.accounts.len());
        buf.extend_from_slice(&self.accounts);
        short_vec::write_length(buf, self.data.len());
        buf.extend_from_slice(&self.data);
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, SolError> {
        let program_id_index = reader.read_u8("program id index")?;
        let num_accounts = reader.read_bounded_length(1, "instruction accounts")?;
        let accounts = reader.read_slice(num_accounts, "instruction accounts")?.to_vec();
        let data_len = reader.read_bounded_length(1, "instruction data")?;
        let data = reader.read_slice(data_len, "instruction data")?.to_vec();
        Ok(Self {
            program_id_index,
            accounts,
            data,
        })
    }

    /// Fail unless every index is below `num_keys`.
    pub(crate) fn check_indices(&self, num_keys: usize) -> Result<(), SolError> {
        let out_of_range = std::iter::once(&self.program_id_index)
            .chain(&self.accounts)
            .find(|&&index| index as usize >= num_keys);
        match out_of_range {
            Some(index) => Err(SolError::Serialization(format!(
                "account index {index} out of range for {num_keys} keys"
            ))),
            None => Ok(()),
        }
    }
}

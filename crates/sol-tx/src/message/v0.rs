//! Versioned message with address lookup tables.
//!
//! Keys are kept in first-seen order through an append-only address → index
//! map and instructions are compiled the moment they are added. Nothing is
//! reordered afterwards: whoever needs the fee payer at index 0 adds it first
//! (via [`VersionedMessage::add_account`] or the first instruction's first
//! account).

use std::collections::HashMap;

use tracing::debug;

use super::{header_count, AddressTableLookup, MessageHeader};
use crate::account::AccountMeta;
use crate::constants::{HASH_LEN, MAX_ACCOUNT_KEYS, MAX_MESSAGE_VERSION, PUBKEY_LEN};
use crate::error::SolError;
use crate::hash::Hash;
use crate::instruction::{CompiledInstruction, Instruction};
use crate::pubkey::Pubkey;
use crate::reader::ByteReader;
use crate::short_vec;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionedMessage {
    version: u8,
    num_required_signatures: u8,
    /// Keys in first-seen order with their merged flags.
    accounts: Vec<AccountMeta>,
    indices: HashMap<Pubkey, u8>,
    recent_blockhash: Option<Hash>,
    instructions: Vec<CompiledInstruction>,
    address_table_lookups: Vec<AddressTableLookup>,
}

impl VersionedMessage {
    /// An empty version 0 message.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(version: u8) -> Result<Self, SolError> {
        if version > MAX_MESSAGE_VERSION {
            return Err(SolError::InvalidVersion(version));
        }
        Ok(Self {
            version,
            ..Self::default()
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    // -- accumulation -------------------------------------------------------

    /// Register one account and return its index. A known address keeps its
    /// index and has its flags merged.
    pub fn add_account(&mut self, meta: AccountMeta) -> Result<u8, SolError> {
        if !self.indices.contains_key(&meta.pubkey) && self.accounts.len() >= MAX_ACCOUNT_KEYS {
            return Err(SolError::TooManyAccounts(self.accounts.len() + 1));
        }
        Ok(self.intern(meta))
    }

    /// Compile `instruction` against the current keys, appending any new ones.
    /// Accounts are registered before the program id. On error nothing
    /// changes.
    pub fn add_instruction(&mut self, instruction: &Instruction) -> Result<&mut Self, SolError> {
        let program = AccountMeta::new_readonly(*instruction.program_id(), false);
        let metas = || instruction.accounts().iter().chain(std::iter::once(&program));

        let mut unseen: Vec<&Pubkey> = metas()
            .map(|meta| &meta.pubkey)
            .filter(|key| !self.indices.contains_key(*key))
            .collect();
        unseen.sort_unstable();
        unseen.dedup();
        let needed = self.accounts.len() + unseen.len();
        if needed > MAX_ACCOUNT_KEYS {
            return Err(SolError::TooManyAccounts(needed));
        }

        let accounts = instruction
            .accounts()
            .iter()
            .map(|meta| self.intern(*meta))
            .collect();
        let program_id_index = self.intern(program);

        self.instructions.push(CompiledInstruction {
            program_id_index,
            accounts,
            data: instruction.data().to_vec(),
        });
        Ok(self)
    }

    /// Append a lookup table reference. Keys are untouched.
    pub fn add_address_table_lookup(&mut self, lookup: AddressTableLookup) -> &mut Self {
        self.address_table_lookups.push(lookup);
        self
    }

    pub fn set_recent_blockhash(&mut self, blockhash: Hash) -> &mut Self {
        self.recent_blockhash = Some(blockhash);
        self
    }

    pub(crate) fn set_num_required_signatures(&mut self, count: u8) {
        self.num_required_signatures = count;
    }

    /// Caller checked capacity.
    fn intern(&mut self, meta: AccountMeta) -> u8 {
        if let Some(&index) = self.indices.get(&meta.pubkey) {
            self.accounts[index as usize].merge(&meta);
            return index;
        }
        let index = self.accounts.len() as u8;
        self.indices.insert(meta.pubkey, index);
        self.accounts.push(meta);
        index
    }

    // -- accessors ----------------------------------------------------------

    pub fn account_keys(&self) -> Vec<Pubkey> {
        self.accounts.iter().map(|meta| meta.pubkey).collect()
    }

    /// Keys with their merged flags, in index order.
    pub fn accounts(&self) -> &[AccountMeta] {
        &self.accounts
    }

    pub fn index_of(&self, pubkey: &Pubkey) -> Option<u8> {
        self.indices.get(pubkey).copied()
    }

    pub fn recent_blockhash(&self) -> Option<&Hash> {
        self.recent_blockhash.as_ref()
    }

    pub fn instructions(&self) -> &[CompiledInstruction] {
        &self.instructions
    }

    pub fn address_table_lookups(&self) -> &[AddressTableLookup] {
        &self.address_table_lookups
    }

    /// Header as it will be serialized.
    ///
    /// `num_required_signatures` is whatever the signing transaction set (0
    /// before signing). Keys are never reordered here, so the read-only
    /// counts only cover the read-only run at the tail of the signer prefix
    /// and at the tail of the remaining keys; a read-only key sitting before
    /// a writable one in its group is reported as writable rather than the
    /// writable key being reported read-only. Key 0 pays the fee and is
    /// always declared writable once anything is signed.
    ///
    /// Fails with `TooManyAccounts` when 256 unsigned read-only keys leave no
    /// byte to count them in.
    pub fn header(&self) -> Result<MessageHeader, SolError> {
        let signers = (self.num_required_signatures as usize).min(self.accounts.len());
        let (signed, unsigned) = self.accounts.split_at(signers);
        let after_fee_payer = signed.get(1..).unwrap_or_default();
        let num_keys = self.accounts.len();
        let readonly_signed = trailing_readonly(after_fee_payer);
        let readonly_unsigned = trailing_readonly(unsigned);
        Ok(MessageHeader {
            num_required_signatures: self.num_required_signatures,
            num_readonly_signed_accounts: header_count(readonly_signed, num_keys)?,
            num_readonly_unsigned_accounts: header_count(readonly_unsigned, num_keys)?,
        })
    }

    // -- wire format --------------------------------------------------------

    pub fn serialized_len(&self) -> usize {
        MessageHeader::LEN
            + short_vec::encoded_len(self.accounts.len())
            + self.accounts.len() * PUBKEY_LEN
            + HASH_LEN
            + short_vec::encoded_len(self.instructions.len())
            + self
                .instructions
                .iter()
                .map(CompiledInstruction::serialized_len)
                .sum::<usize>()
            + short_vec::encoded_len(self.address_table_lookups.len())
            + self
                .address_table_lookups
                .iter()
                .map(AddressTableLookup::serialized_len)
                .sum::<usize>()
    }

    /// The exact bytes signers sign. The version itself travels in the
    /// transaction prefix byte, not here.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let recent_blockhash = self.recent_blockhash.ok_or(SolError::MissingBlockhash)?;
        if self.instructions.is_empty() {
            return Err(SolError::NoInstructions);
        }

        let mut buf = Vec::with_capacity(self.serialized_len());
        self.header()?.write_to(&mut buf);
        short_vec::write_length(&mut buf, self.accounts.len());
        for meta in &self.accounts {
            buf.extend_from_slice(meta.pubkey.as_ref());
        }
        buf.extend_from_slice(recent_blockhash.as_ref());
        short_vec::write_length(&mut buf, self.instructions.len());
        for ix in &self.instructions {
            ix.write_to(&mut buf);
        }
        short_vec::write_length(&mut buf, self.address_table_lookups.len());
        for lookup in &self.address_table_lookups {
            lookup.write_to(&mut buf);
        }

        debug!(
            version = self.version,
            keys = self.accounts.len(),
            instructions = self.instructions.len(),
            lookups = self.address_table_lookups.len(),
            len = buf.len(),
            "serialized versioned message"
        );
        Ok(buf)
    }

    /// Decode a message body produced by [`serialize`](Self::serialize).
    /// `version` comes from the surrounding transaction's prefix byte.
    pub fn deserialize(bytes: &[u8], version: u8) -> Result<Self, SolError> {
        let mut message = Self::with_version(version)?;
        let mut reader = ByteReader::new(bytes);

        let header = MessageHeader::read_from(&mut reader)?;
        let num_keys = reader.read_bounded_length(PUBKEY_LEN, "account keys")?;
        if num_keys > MAX_ACCOUNT_KEYS {
            return Err(SolError::Serialization(format!(
                "{num_keys} account keys exceed the limit of {MAX_ACCOUNT_KEYS}"
            )));
        }
        header.check_against(num_keys)?;

        for i in 0..num_keys {
            let pubkey = Pubkey::new_from_array(reader.read_array("account key")?);
            if message.indices.contains_key(&pubkey) {
                return Err(SolError::Serialization(format!(
                    "duplicate account key {pubkey}"
                )));
            }
            message.intern(AccountMeta {
                pubkey,
                is_signer: header.is_signer(i),
                is_writable: header.is_writable(i, num_keys),
            });
        }
        message.num_required_signatures = header.num_required_signatures;
        message.recent_blockhash = Some(Hash::new_from_array(
            reader.read_array("recent blockhash")?,
        ));

        let num_instructions = reader.read_bounded_length(3, "instructions")?;
        for _ in 0..num_instructions {
            message
                .instructions
                .push(CompiledInstruction::read_from(&mut reader)?);
        }

        // Smallest lookup: table address plus two empty length prefixes.
        let num_lookups = reader.read_bounded_length(PUBKEY_LEN + 2, "address table lookups")?;
        for _ in 0..num_lookups {
            message
                .address_table_lookups
                .push(AddressTableLookup::read_from(&mut reader)?);
        }
        reader.finish()?;

        // Instruction indices may reach into accounts loaded from the tables.
        let loaded: usize = message
            .address_table_lookups
            .iter()
            .map(AddressTableLookup::loaded_len)
            .sum();
        for ix in &message.instructions {
            ix.check_indices(num_keys + loaded)?;
        }

        Ok(message)
    }
}

fn trailing_readonly(accounts: &[AccountMeta]) -> usize {
    accounts
        .iter()
        .rev()
        .take_while(|meta| !meta.is_writable)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    fn transfer_like(from: Pubkey, to: Pubkey) -> Instruction {
        Instruction::new(
            key(0x99),
            vec![AccountMeta::new(from, true), AccountMeta::new(to, false)],
            vec![2, 0, 0, 0],
        )
    }

    // -- accumulation -------------------------------------------------------

    #[test]
    fn keys_are_first_seen_order() {
        let mut message = VersionedMessage::new();
        message.add_instruction(&transfer_like(key(1), key(2))).unwrap();
        message.add_instruction(&transfer_like(key(3), key(1))).unwrap();

        assert_eq!(message.account_keys(), vec![key(1), key(2), key(0x99), key(3)]);
        let second = &message.instructions()[1];
        assert_eq!(second.program_id_index, 2);
        assert_eq!(second.accounts, vec![3, 0]);
    }

    #[test]
    fn flags_are_merged() {
        let mut message = VersionedMessage::new();
        message
            .add_account(AccountMeta::new_readonly(key(2), false))
            .unwrap();
        message.add_instruction(&transfer_like(key(1), key(2))).unwrap();

        assert_eq!(message.index_of(&key(2)), Some(0));
        assert!(message.accounts()[0].is_writable);
    }

    #[test]
    fn lookup_does_not_touch_keys() {
        let mut message = VersionedMessage::new();
        message.add_instruction(&transfer_like(key(1), key(2))).unwrap();
        message.add_address_table_lookup(
            AddressTableLookup::new(key(0x42), &[0, 1], &[2]).unwrap(),
        );
        assert_eq!(message.account_keys().len(), 3);
        assert_eq!(message.address_table_lookups().len(), 1);
    }

    #[test]
    fn full_key_space_rejects_without_mutation() {
        let mut message = VersionedMessage::new();
        for b in 0..=254u8 {
            message.add_account(AccountMeta::new(key(b), false)).unwrap();
        }
        // One slot left; the instruction needs two (account and program).
        let ix = Instruction::new(key(0xff), vec![AccountMeta::new(key_extra(), false)], vec![]);
        let err = message.add_instruction(&ix).unwrap_err();
        assert!(matches!(err, SolError::TooManyAccounts(257)));
        assert_eq!(message.accounts().len(), 255);
        assert!(message.instructions().is_empty());

        message.add_account(AccountMeta::new(key(0xff), false)).unwrap();
        assert!(message.add_account(AccountMeta::new(key_extra(), false)).is_err());
        // Known keys still merge at capacity.
        assert!(message.add_account(AccountMeta::new(key(0), true)).is_ok());
    }

    fn key_extra() -> Pubkey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        Pubkey::new_from_array(bytes)
    }

    #[test]
    fn version_above_127_is_rejected() {
        assert!(VersionedMessage::with_version(127).is_ok());
        assert!(matches!(
            VersionedMessage::with_version(128),
            Err(SolError::InvalidVersion(128))
        ));
    }

    // -- header -------------------------------------------------------------

    #[test]
    fn header_counts_trailing_readonly_runs() {
        let mut message = VersionedMessage::new();
        message.add_account(AccountMeta::new(key(1), true)).unwrap();
        message.add_account(AccountMeta::new_readonly(key(2), true)).unwrap();
        message.add_account(AccountMeta::new(key(3), false)).unwrap();
        message.add_account(AccountMeta::new_readonly(key(4), false)).unwrap();
        message.set_num_required_signatures(2);

        let header = message.header().unwrap();
        assert_eq!(header.num_required_signatures, 2);
        assert_eq!(header.num_readonly_signed_accounts, 1);
        assert_eq!(header.num_readonly_unsigned_accounts, 1);
    }

    #[test]
    fn header_never_marks_a_writable_key_readonly() {
        let mut message = VersionedMessage::new();
        message.add_account(AccountMeta::new(key(1), true)).unwrap();
        message.add_account(AccountMeta::new_readonly(key(2), false)).unwrap();
        message.add_account(AccountMeta::new(key(3), false)).unwrap();
        message.set_num_required_signatures(1);

        let header = message.header().unwrap();
        assert_eq!(header.num_readonly_signed_accounts, 0);
        assert_eq!(header.num_readonly_unsigned_accounts, 0);
    }

    #[test]
    fn fee_payer_is_never_declared_readonly() {
        let mut message = VersionedMessage::new();
        message.add_account(AccountMeta::new_readonly(key(1), true)).unwrap();
        message.add_account(AccountMeta::new(key(2), false)).unwrap();
        message.set_num_required_signatures(1);
        assert_eq!(message.header().unwrap().num_readonly_signed_accounts, 0);

        // Read-only signers after the payer are still counted.
        let mut message = VersionedMessage::new();
        message.add_account(AccountMeta::new_readonly(key(1), true)).unwrap();
        message.add_account(AccountMeta::new_readonly(key(3), true)).unwrap();
        message.add_account(AccountMeta::new(key(2), false)).unwrap();
        message.set_num_required_signatures(2);
        assert_eq!(message.header().unwrap().num_readonly_signed_accounts, 1);
    }

    #[test]
    fn header_rejects_256_unsigned_readonly_keys() {
        let readonly = (1..=255u8)
            .map(|b| AccountMeta::new_readonly(key(b), false))
            .collect();
        let mut message = VersionedMessage::new();
        message
            .add_instruction(&Instruction::new(key(0), readonly, vec![]))
            .unwrap()
            .set_recent_blockhash(Hash::default());

        assert_eq!(message.accounts().len(), 256);
        assert!(matches!(message.header(), Err(SolError::TooManyAccounts(256))));
        assert!(matches!(message.serialize(), Err(SolError::TooManyAccounts(256))));
    }

    #[test]
    fn full_key_space_serializes() {
        let mut accounts = vec![AccountMeta::new(key(0), true)];
        accounts.extend((1..=254u8).map(|b| AccountMeta::new_readonly(key(b), false)));
        let mut message = VersionedMessage::new();
        message
            .add_instruction(&Instruction::new(key(0xff), accounts, vec![]))
            .unwrap()
            .set_recent_blockhash(Hash::default());
        message.set_num_required_signatures(1);

        assert_eq!(message.accounts().len(), 256);
        let bytes = message.serialize().unwrap();
        assert_eq!(&bytes[..3], &[1, 0, 255]);
        assert_eq!(&bytes[3..5], &[0x80, 0x02]);
        assert_eq!(bytes.len(), message.serialized_len());

        let decoded = VersionedMessage::deserialize(&bytes, 0).unwrap();
        assert_eq!(decoded.account_keys(), message.account_keys());
    }

    // -- wire format --------------------------------------------------------

    #[test]
    fn serialize_requires_blockhash() {
        let mut message = VersionedMessage::new();
        message.add_instruction(&transfer_like(key(1), key(2))).unwrap();
        assert!(matches!(message.serialize(), Err(SolError::MissingBlockhash)));
    }

    #[test]
    fn serialize_requires_instructions() {
        let mut message = VersionedMessage::new();
        message.set_recent_blockhash(Hash::default());
        assert!(matches!(message.serialize(), Err(SolError::NoInstructions)));
    }

    #[test]
    fn blockhash_is_raw_bytes() {
        let blockhash: Hash = "Eit7RCyhUixAe2hGBS8oqnw59QK3kgMMjfLME5bm9wRn".parse().unwrap();
        let mut message = VersionedMessage::new();
        message
            .add_instruction(&transfer_like(key(1), key(2)))
            .unwrap()
            .set_recent_blockhash(blockhash);
        let bytes = message.serialize().unwrap();

        // header(3) + count(1) + 3 keys
        let start = 3 + 1 + 3 * 32;
        assert_eq!(&bytes[start..start + 32], blockhash.as_ref());
    }

    #[test]
    fn lookups_follow_instructions() {
        let mut message = VersionedMessage::new();
        message
            .add_instruction(&transfer_like(key(1), key(2)))
            .unwrap()
            .set_recent_blockhash(Hash::default())
            .add_address_table_lookup(AddressTableLookup::new(key(0x42), &[0, 1], &[2]).unwrap());
        let bytes = message.serialize().unwrap();

        assert_eq!(bytes.len(), message.serialized_len());
        let tail = &bytes[bytes.len() - 38..];
        assert_eq!(tail[0], 1);
        assert_eq!(&tail[1..33], key(0x42).as_ref());
        assert_eq!(&tail[33..], &[2, 0, 1, 1, 2]);
    }

    #[test]
    fn deserialize_inverts_serialize() {
        let mut message = VersionedMessage::with_version(3).unwrap();
        message
            .add_instruction(&transfer_like(key(1), key(2)))
            .unwrap()
            .set_recent_blockhash(Hash::new_from_array([7u8; 32]))
            .add_address_table_lookup(AddressTableLookup::new(key(0x42), &[4], &[]).unwrap());
        message
            .add_instruction(&Instruction::new(key(0x98), vec![], vec![1, 2, 3]))
            .unwrap();
        message.set_num_required_signatures(1);

        let bytes = message.serialize().unwrap();
        let decoded = VersionedMessage::deserialize(&bytes, 3).unwrap();
        assert_eq!(decoded.version(), 3);
        assert_eq!(decoded.header().unwrap(), message.header().unwrap());
        assert_eq!(decoded.account_keys(), message.account_keys());
        assert_eq!(decoded.instructions(), message.instructions());
        assert_eq!(decoded.address_table_lookups(), message.address_table_lookups());
        assert_eq!(decoded.serialize().unwrap(), bytes);
    }

    #[test]
    fn deserialize_allows_indices_into_lookups() {
        let mut message = VersionedMessage::new();
        message
            .add_instruction(&transfer_like(key(1), key(2)))
            .unwrap()
            .set_recent_blockhash(Hash::default());
        let mut bytes = message.serialize().unwrap();
        // The instruction's second account index (key 2 -> 1); point it past
        // the three inline keys.
        let pos = bytes.len() - 7;
        assert_eq!(bytes[pos], 1);
        bytes[pos] = 3;
        assert!(VersionedMessage::deserialize(&bytes, 0).is_err());

        // Same message with one lookup entry loading a fourth account.
        message.add_address_table_lookup(AddressTableLookup::new(key(0x42), &[0], &[]).unwrap());
        let mut bytes = message.serialize().unwrap();
        let pos = bytes.len() - 7 - 35;
        bytes[pos] = 3;
        assert!(VersionedMessage::deserialize(&bytes, 0).is_ok());
    }

    #[test]
    fn deserialize_rejects_truncation_and_trailing_bytes() {
        let mut message = VersionedMessage::new();
        message
            .add_instruction(&transfer_like(key(1), key(2)))
            .unwrap()
            .set_recent_blockhash(Hash::default());
        let bytes = message.serialize().unwrap();

        assert!(VersionedMessage::deserialize(&bytes[..bytes.len() - 1], 0).is_err());
        let mut padded = bytes.clone();
        padded.push(0);
        assert!(VersionedMessage::deserialize(&padded, 0).is_err());
        assert!(VersionedMessage::deserialize(&bytes, 0x80).is_err());
    }
}

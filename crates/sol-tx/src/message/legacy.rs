//! Pre-versioning message: one flat key list, no lookup tables.

use tracing::debug;

use super::MessageHeader;
use crate::account::AccountMeta;
use crate::account_table::{AccountOrdering, AccountTable};
use crate::constants::{HASH_LEN, MAX_ACCOUNT_KEYS, PUBKEY_LEN};
use crate::error::SolError;
use crate::hash::Hash;
use crate::instruction::{CompiledInstruction, Instruction};
use crate::pubkey::Pubkey;
use crate::reader::ByteReader;
use crate::short_vec;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates instructions and produces a [`LegacyMessage`].
///
/// Every account an instruction names, and its program id (as a read-only
/// non-signer), is merged into an [`AccountTable`]. Key order, the header
/// and all indices are derived only in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct LegacyMessageBuilder {
    table: AccountTable,
    instructions: Vec<Instruction>,
    recent_blockhash: Option<Hash>,
    fee_payer: Option<Pubkey>,
    ordering: AccountOrdering,
}

impl LegacyMessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_instruction(&mut self, instruction: Instruction) -> &mut Self {
        for meta in instruction.accounts() {
            self.table.add(*meta);
        }
        self.table
            .add(AccountMeta::new_readonly(*instruction.program_id(), false));
        self.instructions.push(instruction);
        self
    }

    pub fn set_recent_blockhash(&mut self, blockhash: Hash) -> &mut Self {
        self.recent_blockhash = Some(blockhash);
        self
    }

    /// The fee payer lands at index 0 as a writable signer, whether or not an
    /// instruction references it.
    pub fn set_fee_payer(&mut self, fee_payer: Pubkey) -> &mut Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    pub fn set_account_ordering(&mut self, ordering: AccountOrdering) -> &mut Self {
        self.ordering = ordering;
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.fee_payer.as_ref()
    }

    pub fn recent_blockhash(&self) -> Option<&Hash> {
        self.recent_blockhash.as_ref()
    }

    /// Order the keys, compile every instruction against them, and derive the
    /// header.
    ///
    /// # Panics
    ///
    /// If an instruction names an address missing from the ordered key list.
    /// `add_instruction` registers every address it sees, so this only fires
    /// on a bug in this crate.
    pub fn build(&self) -> Result<LegacyMessage, SolError> {
        let recent_blockhash = self.recent_blockhash.ok_or(SolError::MissingBlockhash)?;
        if self.instructions.is_empty() {
            return Err(SolError::NoInstructions);
        }

        let ordered = self.table.ordered(self.fee_payer.as_ref(), &self.ordering)?;
        if ordered.len() > MAX_ACCOUNT_KEYS {
            return Err(SolError::TooManyAccounts(ordered.len()));
        }

        let account_keys: Vec<Pubkey> = ordered.iter().map(|meta| meta.pubkey).collect();
        let instructions = self
            .instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&account_keys, ix.program_id()),
                accounts: ix
                    .accounts()
                    .iter()
                    .map(|meta| index_of(&account_keys, &meta.pubkey))
                    .collect(),
                data: ix.data().to_vec(),
            })
            .collect();
        let header = MessageHeader::from_accounts(&ordered)?;

        debug!(
            keys = account_keys.len(),
            instructions = self.instructions.len(),
            signers = header.num_required_signatures,
            "built legacy message"
        );

        Ok(LegacyMessage {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }

    /// Shorthand for `build()?.serialize()`.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        Ok(self.build()?.serialize())
    }
}

/// Reopen a decoded message for editing. Every key is preloaded with its
/// header-derived flags so keys no instruction references survive a rebuild;
/// key 0 becomes the fee payer when the message requires any signature.
impl From<&LegacyMessage> for LegacyMessageBuilder {
    fn from(message: &LegacyMessage) -> Self {
        let mut builder = Self::new();
        for meta in message.account_metas() {
            builder.table.add(meta);
        }
        for ix in message.decompile() {
            builder.add_instruction(ix);
        }
        builder.recent_blockhash = Some(message.recent_blockhash);
        if message.header.num_required_signatures > 0 {
            builder.fee_payer = message.fee_payer().copied();
        }
        builder
    }
}

fn index_of(keys: &[Pubkey], key: &Pubkey) -> u8 {
    let pos = keys
        .iter()
        .position(|k| k == key)
        .unwrap_or_else(|| panic!("account {key} missing from its own account table"));
    // build() caps the list at MAX_ACCOUNT_KEYS, so every position fits.
    pos as u8
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A compiled legacy message. Produced by [`LegacyMessageBuilder::build`] or
/// [`LegacyMessage::deserialize`]; never assembled by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyMessage {
    header: MessageHeader,
    account_keys: Vec<Pubkey>,
    recent_blockhash: Hash,
    instructions: Vec<CompiledInstruction>,
}

impl LegacyMessage {
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn account_keys(&self) -> &[Pubkey] {
        &self.account_keys
    }

    pub fn recent_blockhash(&self) -> &Hash {
        &self.recent_blockhash
    }

    pub fn instructions(&self) -> &[CompiledInstruction] {
        &self.instructions
    }

    /// Key 0, which pays the fee when the message is signed.
    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    /// The keys whose signatures the transaction must carry, in slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        let n = (self.header.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    pub fn is_signer(&self, index: usize) -> bool {
        self.header.is_signer(index)
    }

    pub fn is_writable(&self, index: usize) -> bool {
        index < self.account_keys.len()
            && self.header.is_writable(index, self.account_keys.len())
    }

    /// Every key with the flags its position implies.
    pub fn account_metas(&self) -> Vec<AccountMeta> {
        self.account_keys
            .iter()
            .enumerate()
            .map(|(i, pubkey)| AccountMeta {
                pubkey: *pubkey,
                is_signer: self.is_signer(i),
                is_writable: self.is_writable(i),
            })
            .collect()
    }

    /// Turn compiled instructions back into [`Instruction`]s, with account
    /// flags taken from the header.
    pub fn decompile(&self) -> Vec<Instruction> {
        let metas = self.account_metas();
        self.instructions
            .iter()
            .map(|ix| {
                let accounts = ix
                    .accounts
                    .iter()
                    .map(|&index| metas[index as usize])
                    .collect();
                Instruction::new(
                    self.account_keys[ix.program_id_index as usize],
                    accounts,
                    ix.data.clone(),
                )
            })
            .collect()
    }

    pub fn serialized_len(&self) -> usize {
        MessageHeader::LEN
            + short_vec::encoded_len(self.account_keys.len())
            + self.account_keys.len() * PUBKEY_LEN
            + HASH_LEN
            + short_vec::encoded_len(self.instructions.len())
            + self
                .instructions
                .iter()
                .map(CompiledInstruction::serialized_len)
                .sum::<usize>()
    }

    /// The exact bytes signers sign.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_len());
        self.write_to(&mut buf);
        buf
    }

    pub(crate) fn write_to(&self, buf: &mut Vec<u8>) {
        self.header.write_to(buf);
        short_vec::write_length(buf, self.account_keys.len());
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_ref());
        }
        buf.extend_from_slice(self.recent_blockhash.as_ref());
        short_vec::write_length(buf, self.instructions.len());
        for ix in &self.instructions {
            ix.write_to(buf);
        }
    }

    /// Inverse of [`serialize`](Self::serialize). The whole input must be
    /// consumed.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SolError> {
        let mut reader = ByteReader::new(bytes);
        let message = Self::read_from(&mut reader)?;
        reader.finish()?;
        Ok(message)
    }

    pub(crate) fn read_from(reader: &mut ByteReader<'_>) -> Result<Self, SolError> {
        let header = MessageHeader::read_from(reader)?;

        let num_keys = reader.read_bounded_length(PUBKEY_LEN, "account keys")?;
        if num_keys > MAX_ACCOUNT_KEYS {
            return Err(SolError::Serialization(format!(
                "{num_keys} account keys exceed the limit of {MAX_ACCOUNT_KEYS}"
            )));
        }
        header.check_against(num_keys)?;
        let account_keys = (0..num_keys)
            .map(|_| reader.read_array::<PUBKEY_LEN>("account key").map(Pubkey::new_from_array))
            .collect::<Result<Vec<_>, _>>()?;

        let recent_blockhash = Hash::new_from_array(reader.read_array("recent blockhash")?);

        // Smallest instruction: index byte plus two empty length prefixes.
        let num_instructions = reader.read_bounded_length(3, "instructions")?;
        let mut instructions = Vec::with_capacity(num_instructions);
        for _ in 0..num_instructions {
            let ix = CompiledInstruction::read_from(reader)?;
            ix.check_indices(num_keys)?;
            instructions.push(ix);
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    fn blockhash() -> Hash {
        Hash::new_from_array([0xbb; 32])
    }

    /// payer → recipient transfer-shaped instruction on program `0x99`.
    fn transfer_like(payer: Pubkey, to: Pubkey) -> Instruction {
        Instruction::new(
            key(0x99),
            vec![AccountMeta::new(payer, true), AccountMeta::new(to, false)],
            vec![2, 0, 0, 0],
        )
    }

    // -- build --------------------------------------------------------------

    #[test]
    fn build_requires_blockhash() {
        let mut builder = LegacyMessageBuilder::new();
        builder.add_instruction(transfer_like(key(1), key(2)));
        assert!(matches!(builder.build(), Err(SolError::MissingBlockhash)));
    }

    #[test]
    fn build_requires_instructions() {
        let mut builder = LegacyMessageBuilder::new();
        builder.set_recent_blockhash(blockhash());
        assert!(matches!(builder.build(), Err(SolError::NoInstructions)));
    }

    #[test]
    fn build_orders_and_indexes() {
        let (payer, to) = (key(1), key(2));
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(transfer_like(payer, to))
            .set_recent_blockhash(blockhash())
            .set_fee_payer(payer);

        let message = builder.build().unwrap();
        assert_eq!(message.account_keys(), &[payer, to, key(0x99)]);
        assert_eq!(
            *message.header(),
            MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            }
        );
        let ix = &message.instructions()[0];
        assert_eq!(ix.program_id_index, 2);
        assert_eq!(ix.accounts, vec![0, 1]);
    }

    #[test]
    fn fee_payer_not_in_any_instruction_is_added() {
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(Instruction::new(key(0x99), vec![], vec![]))
            .set_recent_blockhash(blockhash())
            .set_fee_payer(key(7));

        let message = builder.build().unwrap();
        assert_eq!(message.account_keys(), &[key(7), key(0x99)]);
        assert_eq!(message.signer_keys(), &[key(7)]);
    }

    #[test]
    fn too_many_accounts() {
        // 256 distinct accounts; key(0) doubles as the first program id.
        let accounts = (0..=255u8)
            .map(|b| AccountMeta::new(key(b), false))
            .collect();
        let mut extra_program = [0u8; 32];
        extra_program[0] = 1;
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(Instruction::new(key(0), accounts, vec![]))
            .add_instruction(Instruction::new(extra_program.into(), vec![], vec![]))
            .set_recent_blockhash(blockhash());
        assert!(matches!(builder.build(), Err(SolError::TooManyAccounts(257))));
    }

    #[test]
    fn full_key_list_builds() {
        // Payer, 254 read-only accounts and the program: exactly 256 keys.
        let mut accounts = vec![AccountMeta::new(key(0), true)];
        accounts.extend((1..=254u8).map(|b| AccountMeta::new_readonly(key(b), false)));
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(Instruction::new(key(0xff), accounts, vec![]))
            .set_recent_blockhash(blockhash())
            .set_fee_payer(key(0));

        let message = builder.build().unwrap();
        assert_eq!(message.account_keys().len(), 256);
        let bytes = message.serialize();
        assert_eq!(&bytes[..3], &[1, 0, 255]);
        assert_eq!(&bytes[3..5], &[0x80, 0x02]);
        assert_eq!(message.instructions()[0].program_id_index, 255);
        assert_eq!(LegacyMessage::deserialize(&bytes).unwrap(), message);
    }

    #[test]
    fn readonly_class_of_256_is_rejected() {
        let readonly = (1..=255u8)
            .map(|b| AccountMeta::new_readonly(key(b), false))
            .collect();
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(Instruction::new(key(0), readonly, vec![]))
            .set_recent_blockhash(blockhash());
        assert!(matches!(builder.build(), Err(SolError::TooManyAccounts(256))));
    }

    #[test]
    fn explicit_ordering_is_respected() {
        let (payer, a, b) = (key(1), key(2), key(3));
        let ix = Instruction::new(
            key(0x99),
            vec![
                AccountMeta::new(payer, true),
                AccountMeta::new(a, false),
                AccountMeta::new(b, false),
            ],
            vec![],
        );
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(ix)
            .set_recent_blockhash(blockhash())
            .set_fee_payer(payer)
            .set_account_ordering(AccountOrdering::explicit([
                (payer, 0),
                (b, 1),
                (a, 2),
                (key(0x99), 3),
            ]));

        let message = builder.build().unwrap();
        assert_eq!(message.account_keys(), &[payer, b, a, key(0x99)]);
        assert_eq!(message.instructions()[0].accounts, vec![0, 2, 1]);
        assert_eq!(message.instructions()[0].program_id_index, 3);
    }

    #[test]
    fn explicit_ordering_must_keep_header_classes() {
        let (payer, to) = (key(1), key(2));
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(transfer_like(payer, to))
            .set_recent_blockhash(blockhash())
            .set_fee_payer(payer)
            .set_account_ordering(AccountOrdering::explicit([
                (payer, 0),
                (key(0x99), 1),
                (to, 2),
            ]));
        assert!(matches!(builder.build(), Err(SolError::InvalidOrdering(_))));
    }

    // -- wire format --------------------------------------------------------

    #[test]
    fn serialized_layout() {
        let (payer, to) = (key(1), key(2));
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(transfer_like(payer, to))
            .set_recent_blockhash(blockhash())
            .set_fee_payer(payer);
        let bytes = builder.serialize().unwrap();

        assert_eq!(&bytes[..4], &[1, 0, 1, 3]);
        assert_eq!(&bytes[4..36], payer.as_ref());
        assert_eq!(&bytes[100..132], blockhash().as_ref());
        // One instruction: program 2, accounts [0, 1], four data bytes.
        assert_eq!(&bytes[132..], &[1, 2, 2, 0, 1, 4, 2, 0, 0, 0]);
        assert_eq!(bytes.len(), builder.build().unwrap().serialized_len());
    }

    #[test]
    fn deserialize_inverts_serialize() {
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(transfer_like(key(1), key(2)))
            .add_instruction(Instruction::new(
                key(0x98),
                vec![AccountMeta::new_readonly(key(3), true)],
                vec![],
            ))
            .set_recent_blockhash(blockhash())
            .set_fee_payer(key(1));
        let message = builder.build().unwrap();

        let decoded = LegacyMessage::deserialize(&message.serialize()).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.decompile(), builder.instructions());
    }

    #[test]
    fn deserialize_rejects_trailing_bytes() {
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(transfer_like(key(1), key(2)))
            .set_recent_blockhash(blockhash());
        let mut bytes = builder.serialize().unwrap();
        bytes.push(0);
        assert!(LegacyMessage::deserialize(&bytes).is_err());
    }

    #[test]
    fn deserialize_rejects_every_truncation() {
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(transfer_like(key(1), key(2)))
            .set_recent_blockhash(blockhash());
        let bytes = builder.serialize().unwrap();
        for len in 0..bytes.len() {
            assert!(
                LegacyMessage::deserialize(&bytes[..len]).is_err(),
                "prefix of {len} bytes decoded"
            );
        }
    }

    #[test]
    fn deserialize_rejects_out_of_range_index() {
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(transfer_like(key(1), key(2)))
            .set_recent_blockhash(blockhash());
        let mut bytes = builder.serialize().unwrap();
        // Program id index of the only instruction.
        let pos = bytes.len() - 9;
        bytes[pos] = 9;
        let err = LegacyMessage::deserialize(&bytes).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    // -- decompile / reopen -------------------------------------------------

    #[test]
    fn account_flags_follow_header() {
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(Instruction::new(
                key(0x99),
                vec![
                    AccountMeta::new_readonly(key(3), true),
                    AccountMeta::new(key(4), false),
                ],
                vec![],
            ))
            .set_recent_blockhash(blockhash())
            .set_fee_payer(key(1));
        let message = builder.build().unwrap();

        let metas = message.account_metas();
        assert_eq!(
            metas,
            vec![
                AccountMeta::new(key(1), true),
                AccountMeta::new_readonly(key(3), true),
                AccountMeta::new(key(4), false),
                AccountMeta::new_readonly(key(0x99), false),
            ]
        );
        assert!(!message.is_writable(4));
    }

    #[test]
    fn reopened_builder_rebuilds_same_message() {
        let mut builder = LegacyMessageBuilder::new();
        builder
            .add_instruction(transfer_like(key(1), key(2)))
            .set_recent_blockhash(blockhash())
            .set_fee_payer(key(1));
        let message = builder.build().unwrap();

        let reopened = LegacyMessageBuilder::from(&message);
        assert_eq!(reopened.fee_payer(), Some(&key(1)));
        assert_eq!(reopened.build().unwrap(), message);
    }
}

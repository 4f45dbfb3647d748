use crate::pubkey::Pubkey;

/// One account referenced by an instruction, with its permission bits.
///
/// Two metas describe the same account iff their addresses are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account.
    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }

    /// Canonical position class:
    ///   0. writable signers
    ///   1. read-only signers
    ///   2. writable non-signers
    ///   3. read-only non-signers
    pub(crate) fn rank(&self) -> u8 {
        match (self.is_signer, self.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }

    /// OR the permission bits of `other` into `self`.
    pub(crate) fn merge(&mut self, other: &AccountMeta) {
        self.is_signer |= other.is_signer;
        self.is_writable |= other.is_writable;
    }
}

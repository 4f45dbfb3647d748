//! Deduplicated account set with deterministic ordering.
//!
//! The table remembers first-seen order and merges permission bits when an
//! address is added again. [`AccountTable::ordered`] turns it into the final
//! key list of a legacy message.

use std::collections::HashMap;

use crate::account::AccountMeta;
use crate::error::SolError;
use crate::pubkey::Pubkey;

/// How [`AccountTable::ordered`] arranges keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccountOrdering {
    /// Signer/writable classes, first-seen order within a class, fee payer
    /// forced to index 0.
    #[default]
    Default,
    /// Ascending caller-supplied position for every account. The fee payer
    /// must hold the smallest hint and the result must still group keys the
    /// way the message header describes them (writable signers, read-only
    /// signers, writable, read-only); no other reordering happens.
    Explicit(HashMap<Pubkey, u32>),
}

impl AccountOrdering {
    pub fn explicit(hints: impl IntoIterator<Item = (Pubkey, u32)>) -> Self {
        AccountOrdering::Explicit(hints.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountTable {
    entries: Vec<AccountMeta>,
    positions: HashMap<Pubkey, usize>,
}

impl AccountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `meta`, or OR its flags into the existing entry for the same
    /// address.
    pub fn add(&mut self, meta: AccountMeta) {
        match self.positions.get(&meta.pubkey) {
            Some(&pos) => self.entries[pos].merge(&meta),
            None => {
                self.positions.insert(meta.pubkey, self.entries.len());
                self.entries.push(meta);
            }
        }
    }

    pub fn get(&self, pubkey: &Pubkey) -> Option<&AccountMeta> {
        self.positions.get(pubkey).map(|&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &AccountMeta> {
        self.entries.iter()
    }

    /// Final key order for a message paid for by `fee_payer`.
    pub fn ordered(
        &self,
        fee_payer: Option<&Pubkey>,
        ordering: &AccountOrdering,
    ) -> Result<Vec<AccountMeta>, SolError> {
        match ordering {
            AccountOrdering::Default => Ok(self.ordered_by_class(fee_payer)),
            AccountOrdering::Explicit(hints) => self.ordered_by_hint(fee_payer, hints),
        }
    }

    fn ordered_by_class(&self, fee_payer: Option<&Pubkey>) -> Vec<AccountMeta> {
        let mut list = self.entries.clone();
        // Stable: first-seen order survives inside each class.
        list.sort_by_key(AccountMeta::rank);

        if let Some(payer) = fee_payer {
            list.retain(|meta| meta.pubkey != *payer);
            list.insert(0, AccountMeta::new(*payer, true));
        }
        list
    }

    fn ordered_by_hint(
        &self,
        fee_payer: Option<&Pubkey>,
        hints: &HashMap<Pubkey, u32>,
    ) -> Result<Vec<AccountMeta>, SolError> {
        let mut keyed = Vec::with_capacity(self.entries.len());
        for meta in &self.entries {
            let hint = hints.get(&meta.pubkey).ok_or_else(|| {
                SolError::InvalidOrdering(format!("no position hint for {}", meta.pubkey))
            })?;
            keyed.push((*hint, *meta));
        }

        if let Some(payer) = fee_payer {
            let payer_hint = self
                .get(payer)
                .and_then(|_| hints.get(payer))
                .ok_or_else(|| {
                    SolError::InvalidOrdering(format!("fee payer {payer} is not in the table"))
                })?;
            let undercut = keyed
                .iter()
                .any(|(hint, meta)| meta.pubkey != *payer && hint <= payer_hint);
            if undercut {
                return Err(SolError::InvalidOrdering(format!(
                    "fee payer {payer} must hold the smallest position hint"
                )));
            }
        }

        keyed.sort_by_key(|(hint, _)| *hint);
        if let Some(pair) = keyed.windows(2).find(|pair| pair[0].1.rank() > pair[1].1.rank()) {
            return Err(SolError::InvalidOrdering(format!(
                "{} cannot follow {}: keys must stay grouped by signer and writable flags",
                pair[1].1.pubkey, pair[0].1.pubkey
            )));
        }
        Ok(keyed.into_iter().map(|(_, meta)| meta).collect())
    }
}

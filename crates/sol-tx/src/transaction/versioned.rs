use base64::Engine as _;
use tracing::{debug, trace};

use crate::account::AccountMeta;
use crate::constants::{SIGNATURE_LEN, VERSION_PREFIX};
use crate::error::SolError;
use crate::hash::Hash;
use crate::instruction::Instruction;
use crate::message::{AddressTableLookup, VersionedMessage};
use crate::signature::Signature;
use crate::signer::Signer;

/// A [`VersionedMessage`] plus its signatures.
///
/// Keys are never reordered, so the caller decides who pays: signer `i` must
/// own key `i`, and signer 0 (key 0) pays the fee. The wire form carries no
/// signature count; the prefix byte announces the version instead.
#[derive(Debug, Clone, Default)]
pub struct VersionedTransaction {
    message: VersionedMessage,
    signatures: Vec<Signature>,
}

impl VersionedTransaction {
    pub fn new(message: VersionedMessage) -> Self {
        Self {
            message,
            signatures: Vec::new(),
        }
    }

    pub fn message(&self) -> &VersionedMessage {
        &self.message
    }

    pub fn add_account(&mut self, meta: AccountMeta) -> Result<u8, SolError> {
        self.invalidate();
        self.message.add_account(meta)
    }

    pub fn add_instruction(&mut self, instruction: &Instruction) -> Result<&mut Self, SolError> {
        self.invalidate();
        self.message.add_instruction(instruction)?;
        Ok(self)
    }

    pub fn add_address_table_lookup(&mut self, lookup: AddressTableLookup) -> &mut Self {
        self.invalidate();
        self.message.add_address_table_lookup(lookup);
        self
    }

    pub fn set_recent_blockhash(&mut self, blockhash: Hash) -> &mut Self {
        self.invalidate();
        self.message.set_recent_blockhash(blockhash);
        self
    }

    /// Drop the signatures together with the signer count they were made
    /// under; the wire form has no other place to record how many follow.
    fn invalidate(&mut self) {
        self.signatures.clear();
        self.message.set_num_required_signatures(0);
    }

    /// Declare `signers.len()` required signatures and sign the message bytes
    /// with each signer in order.
    pub fn sign(&mut self, signers: &[&dyn Signer]) -> Result<(), SolError> {
        self.invalidate();
        if signers.is_empty() {
            return Err(SolError::NoSigners);
        }

        let keys = self.message.account_keys();
        if signers.len() > keys.len() {
            return Err(SolError::SignerMismatch(format!(
                "{} signers for {} account keys",
                signers.len(),
                keys.len()
            )));
        }
        for (index, (signer, key)) in signers.iter().zip(&keys).enumerate() {
            let pubkey = signer.pubkey();
            if pubkey != *key {
                return Err(SolError::SignerMismatch(format!(
                    "signer {index} is {pubkey} but key {index} is {key}"
                )));
            }
        }
        let count = u8::try_from(signers.len()).map_err(|_| {
            SolError::SignerMismatch(format!("{} signers exceed 255", signers.len()))
        })?;

        self.message.set_num_required_signatures(count);
        let signed = self.message.serialize().and_then(|payload| {
            signers
                .iter()
                .map(|signer| signer.try_sign_message(&payload))
                .collect::<Result<Vec<_>, _>>()
        });
        let signatures = match signed {
            Ok(signatures) => signatures,
            Err(err) => {
                self.invalidate();
                return Err(err);
            }
        };

        debug!(
            version = self.message.version(),
            signers = signatures.len(),
            fee_payer = %keys[0],
            "signed versioned transaction"
        );
        self.signatures = signatures;
        Ok(())
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// The fee payer's signature, which doubles as the transaction id.
    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    /// Check every signature against the key in the same position.
    pub fn verify(&self) -> Result<(), SolError> {
        if self.signatures.is_empty() {
            return Err(SolError::SignerMismatch("transaction is not signed".into()));
        }
        let payload = self.message.serialize()?;
        for (signature, key) in self.signatures.iter().zip(self.message.account_keys()) {
            if !signature.verify(&key, &payload) {
                return Err(SolError::InvalidSignature(format!(
                    "signature for {key} does not verify"
                )));
            }
        }
        Ok(())
    }

    /// `(0x80 | version) · signatures · message`.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let message = self.message.serialize()?;

        let mut buf = Vec::with_capacity(1 + self.signatures.len() * SIGNATURE_LEN + message.len());
        buf.push(VERSION_PREFIX | self.message.version());
        for signature in &self.signatures {
            buf.extend_from_slice(signature.as_ref());
        }
        buf.extend_from_slice(&message);

        trace!(len = buf.len(), signatures = self.signatures.len(), "serialized versioned transaction");
        Ok(buf)
    }

    pub fn serialize_base64(&self) -> Result<String, SolError> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.serialize()?))
    }
}

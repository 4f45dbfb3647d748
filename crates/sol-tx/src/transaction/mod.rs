//! Signed transactions and their wire format.
//!
//! ```text
//! Legacy transaction:
//!   num_signatures          short_vec
//!   signatures              64 bytes * num_signatures
//!   message                 LegacyMessage
//!
//! Versioned transaction:
//!   prefix                  u8 (0x80 | version)
//!   signatures              64 bytes * num_required_signatures
//!   message                 VersionedMessage
//! ```
//!
//! Signature `i` always belongs to account key `i`.

mod versioned;

pub use versioned::VersionedTransaction;

use std::borrow::Cow;

use base64::Engine as _;
use tracing::{debug, trace};

use crate::account_table::AccountOrdering;
use crate::constants::{PACKET_DATA_SIZE, SIGNATURE_LEN};
use crate::error::SolError;
use crate::hash::Hash;
use crate::instruction::Instruction;
use crate::message::{LegacyMessage, LegacyMessageBuilder};
use crate::pubkey::Pubkey;
use crate::reader::ByteReader;
use crate::short_vec;
use crate::signature::Signature;
use crate::signer::Signer;

/// A legacy transaction: a [`LegacyMessageBuilder`], the message compiled from
/// it, and one signature per required signer.
///
/// Mutating the transaction drops the compiled message and every signature,
/// since they no longer cover the payload.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    builder: LegacyMessageBuilder,
    message: Option<LegacyMessage>,
    signatures: Vec<Signature>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    // -- building -----------------------------------------------------------

    pub fn add_instruction(&mut self, instruction: Instruction) -> &mut Self {
        self.invalidate();
        self.builder.add_instruction(instruction);
        self
    }

    pub fn set_recent_blockhash(&mut self, blockhash: Hash) -> &mut Self {
        self.invalidate();
        self.builder.set_recent_blockhash(blockhash);
        self
    }

    /// Overridden by [`sign`](Self::sign), which always makes the first
    /// signer the fee payer.
    pub fn set_fee_payer(&mut self, fee_payer: Pubkey) -> &mut Self {
        self.invalidate();
        self.builder.set_fee_payer(fee_payer);
        self
    }

    pub fn set_account_ordering(&mut self, ordering: AccountOrdering) -> &mut Self {
        self.invalidate();
        self.builder.set_account_ordering(ordering);
        self
    }

    fn invalidate(&mut self) {
        self.message = None;
        self.signatures.clear();
    }

    /// The compiled message: the one signed or decoded, or a fresh build.
    pub fn message(&self) -> Result<Cow<'_, LegacyMessage>, SolError> {
        match &self.message {
            Some(message) => Ok(Cow::Borrowed(message)),
            None => Ok(Cow::Owned(self.builder.build()?)),
        }
    }

    // -- signing ------------------------------------------------------------

    /// Make `signers[0]` the fee payer, compile the message, and have every
    /// signer sign its bytes once, in order.
    ///
    /// Each signature lands in the slot of the signer's key. Every signer must
    /// be a required signer of the message and every required signer must be
    /// present, otherwise [`SolError::SignerMismatch`]. On error the
    /// transaction holds no signatures.
    pub fn sign(&mut self, signers: &[&dyn Signer]) -> Result<(), SolError> {
        self.invalidate();
        let fee_payer = signers.first().ok_or(SolError::NoSigners)?.pubkey();
        self.builder.set_fee_payer(fee_payer);

        let message = self.builder.build()?;
        let payload = message.serialize();
        let required = message.signer_keys();

        let mut slots: Vec<Option<Signature>> = vec![None; required.len()];
        for signer in signers {
            let pubkey = signer.pubkey();
            let slot = required.iter().position(|key| *key == pubkey).ok_or_else(|| {
                SolError::SignerMismatch(format!("{pubkey} is not a required signer"))
            })?;
            slots[slot] = Some(signer.try_sign_message(&payload)?);
        }

        let signatures = slots
            .into_iter()
            .zip(required)
            .map(|(slot, key)| {
                slot.ok_or_else(|| SolError::SignerMismatch(format!("missing signature for {key}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            signers = signatures.len(),
            fee_payer = %fee_payer,
            message_len = payload.len(),
            "signed legacy transaction"
        );
        self.signatures = signatures;
        self.message = Some(message);
        Ok(())
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty() && self.signatures.iter().all(|sig| !sig.is_placeholder())
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// The fee payer's signature, which doubles as the transaction id.
    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first().filter(|sig| !sig.is_placeholder())
    }

    /// Check every signature slot against its key.
    pub fn verify(&self) -> Result<(), SolError> {
        let message = self.message()?;
        let required = message.signer_keys();
        if self.signatures.len() != required.len() {
            return Err(SolError::SignerMismatch(format!(
                "{} signatures for {} required signers",
                self.signatures.len(),
                required.len()
            )));
        }

        let payload = message.serialize();
        for (signature, key) in self.signatures.iter().zip(required) {
            if !signature.verify(key, &payload) {
                return Err(SolError::InvalidSignature(format!(
                    "signature for {key} does not verify"
                )));
            }
        }
        Ok(())
    }

    // -- wire format --------------------------------------------------------

    /// Wire bytes. An unsigned transaction carries zeroed placeholder
    /// signatures, one per required signer.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let message = self.message()?;
        let placeholders;
        let signatures = if self.signatures.is_empty() {
            placeholders =
                vec![Signature::default(); message.header().num_required_signatures as usize];
            &placeholders
        } else {
            &self.signatures
        };

        let mut buf = Vec::with_capacity(
            short_vec::encoded_len(signatures.len())
                + signatures.len() * SIGNATURE_LEN
                + message.serialized_len(),
        );
        short_vec::write_length(&mut buf, signatures.len());
        for signature in signatures {
            buf.extend_from_slice(signature.as_ref());
        }
        message.write_to(&mut buf);

        trace!(len = buf.len(), signatures = signatures.len(), "serialized legacy transaction");
        Ok(buf)
    }

    /// [`serialize`](Self::serialize) in standard base64, the encoding
    /// `sendTransaction` expects.
    pub fn serialize_base64(&self) -> Result<String, SolError> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.serialize()?))
    }

    /// Whether the wire form fits in one network packet.
    pub fn fits_in_packet(&self) -> Result<bool, SolError> {
        Ok(self.serialize()?.len() <= PACKET_DATA_SIZE)
    }

    /// Inverse of [`serialize`](Self::serialize).
    ///
    /// The signature count must match the header and every byte must be
    /// consumed. The decoded message is kept as-is, so re-serializing
    /// reproduces the input exactly until the transaction is modified.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SolError> {
        let mut reader = ByteReader::new(bytes);

        let num_signatures = reader.read_bounded_length(SIGNATURE_LEN, "signatures")?;
        let signatures = (0..num_signatures)
            .map(|_| {
                reader
                    .read_array::<SIGNATURE_LEN>("signature")
                    .map(Signature::new_from_array)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let message = LegacyMessage::read_from(&mut reader)?;
        reader.finish()?;

        let required = message.header().num_required_signatures as usize;
        if num_signatures != required {
            return Err(SolError::Serialization(format!(
                "{num_signatures} signatures for {required} required signers"
            )));
        }

        Ok(Self {
            builder: LegacyMessageBuilder::from(&message),
            message: Some(message),
            signatures,
        })
    }
}

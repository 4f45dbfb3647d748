use thiserror::Error;

/// Errors raised while building, signing, or decoding transactions.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid blockhash: {0}")]
    InvalidHash(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("recent blockhash is not set")]
    MissingBlockhash,

    #[error("message has no instructions")]
    NoInstructions,

    #[error("no signers supplied")]
    NoSigners,

    #[error("lookup table index {0} is outside 0..=255")]
    LookupIndexOutOfRange(usize),

    #[error("too many account keys: {0} (max 256)")]
    TooManyAccounts(usize),

    #[error("invalid account ordering: {0}")]
    InvalidOrdering(String),

    #[error("signer mismatch: {0}")]
    SignerMismatch(String),

    #[error("invalid message version: {0} (max 127)")]
    InvalidVersion(u8),

    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),

    #[error("signing error: {0}")]
    Signing(#[from] ed25519_dalek::SignatureError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = SolError::InvalidAddress("bad decode".into());
        assert_eq!(err.to_string(), "invalid address: bad decode");
    }

    #[test]
    fn display_missing_blockhash() {
        assert_eq!(
            SolError::MissingBlockhash.to_string(),
            "recent blockhash is not set"
        );
    }

    #[test]
    fn display_lookup_index_out_of_range() {
        let err = SolError::LookupIndexOutOfRange(300);
        assert_eq!(err.to_string(), "lookup table index 300 is outside 0..=255");
    }

    #[test]
    fn display_too_many_accounts() {
        let err = SolError::TooManyAccounts(257);
        assert_eq!(err.to_string(), "too many account keys: 257 (max 256)");
    }

    #[test]
    fn display_invalid_instruction() {
        let err = SolError::InvalidInstruction("lamports must be > 0".into());
        assert_eq!(err.to_string(), "invalid instruction: lamports must be > 0");
    }

    #[test]
    fn display_serialization_error() {
        let err = SolError::Serialization("short_vec overflow".into());
        assert_eq!(err.to_string(), "serialization error: short_vec overflow");
    }

    #[test]
    fn signing_error_converts_from_dalek() {
        let err: SolError = ed25519_dalek::SignatureError::new().into();
        assert!(err.to_string().starts_with("signing error"));
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(SolError::NoSigners);
        assert!(err.to_string().contains("signers"));
    }

    #[test]
    fn debug_format_works() {
        let debug = format!("{:?}", SolError::NoInstructions);
        assert!(debug.contains("NoInstructions"));
    }
}

//! System Program instructions.
//!
//! Data is a little-endian u32 instruction index followed by the
//! instruction's fixed-width arguments.

use sol_tx::{AccountMeta, Instruction, Pubkey, SolError};
use tracing::trace;

/// The System Program: 32 zero bytes, `11111111111111111111111111111111`.
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

const CREATE_ACCOUNT: u32 = 0;
const ASSIGN: u32 = 1;
const TRANSFER: u32 = 2;
const ALLOCATE: u32 = 8;

/// Move `lamports` from `from` (signer) to `to`.
pub fn transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<Instruction, SolError> {
    if lamports == 0 {
        return Err(SolError::InvalidInstruction("lamports must be > 0".into()));
    }

    // u32 LE index (2 = Transfer) + u64 LE lamports.
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&TRANSFER.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    trace!(%from, %to, lamports, "system transfer");
    Ok(Instruction::new(
        SYSTEM_PROGRAM_ID,
        vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data,
    ))
}

/// Fund a new account with `lamports`, reserve `space` bytes, and hand it to
/// `owner`. Both `from` and `new_account` sign.
pub fn create_account(
    from: &Pubkey,
    new_account: &Pubkey,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&CREATE_ACCOUNT.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_ref());

    Instruction::new(
        SYSTEM_PROGRAM_ID,
        vec![
            AccountMeta::new(*from, true),
            AccountMeta::new(*new_account, true),
        ],
        data,
    )
}

pub fn assign(account: &Pubkey, owner: &Pubkey) -> Instruction {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&ASSIGN.to_le_bytes());
    data.extend_from_slice(owner.as_ref());

    Instruction::new(SYSTEM_PROGRAM_ID, vec![AccountMeta::new(*account, true)], data)
}

pub fn allocate(account: &Pubkey, space: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&ALLOCATE.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());

    Instruction::new(SYSTEM_PROGRAM_ID, vec![AccountMeta::new(*account, true)], data)
}

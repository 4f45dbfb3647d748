use sol_tx::{AccountMeta, Instruction, Pubkey};

/// Memo v2: `MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr`
pub const MEMO_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x05, 0x4a, 0x53, 0x5a, 0x99, 0x29, 0x21, 0x06, 0x4d, 0x24, 0xe8, 0x71, 0x60, 0xda, 0x38, 0x7c,
    0x7c, 0x35, 0xb5, 0xdd, 0xbc, 0x92, 0xbb, 0x81, 0xe4, 0x1f, 0xa8, 0x40, 0x41, 0x05, 0x44, 0x8d,
]);

/// Attach UTF-8 `text` to the transaction. Each of `signers` must sign, which
/// the program checks; pass none for an unsigned memo.
pub fn memo(text: &str, signers: &[Pubkey]) -> Instruction {
    let accounts = signers
        .iter()
        .map(|key| AccountMeta::new_readonly(*key, true))
        .collect();
    Instruction::new(MEMO_PROGRAM_ID, accounts, text.as_bytes())
}

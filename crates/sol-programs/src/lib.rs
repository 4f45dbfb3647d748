//! Instruction factories for the well-known native and SPL programs.
//!
//! Every function here only produces an [`Instruction`](sol_tx::Instruction);
//! ordering, compiling and signing happen in `sol-tx`.

pub mod compute_budget;
pub mod memo;
pub mod system;
pub mod token;

pub use compute_budget::{set_compute_unit_limit, set_compute_unit_price, COMPUTE_BUDGET_PROGRAM_ID};
pub use memo::{memo, MEMO_PROGRAM_ID};
pub use system::SYSTEM_PROGRAM_ID;
pub use token::{derive_associated_token_address, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};

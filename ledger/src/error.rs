use rewards_types::{Address, TokenId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient {token} balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        token: TokenId,
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("insufficient {token} allowance from {owner} to {spender}: need {needed}, have {available}")]
    InsufficientAllowance {
        token: TokenId,
        owner: Address,
        spender: Address,
        needed: u128,
        available: u128,
    },

    #[error("arithmetic overflow in {0} ledger")]
    Overflow(TokenId),
}

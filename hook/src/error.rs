//! Hook errors.

use rewards_ledger::LedgerError;
use rewards_types::{Address, TokenId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("donation {0} not found")]
    DonationNotFound(u64),

    #[error("{caller} is not allowed to call {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    #[error("arithmetic overflow in reward computation")]
    ArithmeticOverflow,

    #[error("hook holds too little {token}: need {needed}, available {available}")]
    InsufficientBalance {
        token: TokenId,
        needed: u128,
        available: u128,
    },

    #[error("payout failed ({payout}) and returning an earlier payout failed too ({revert})")]
    RollbackFailed {
        #[source]
        payout: LedgerError,
        revert: LedgerError,
    },

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),
}

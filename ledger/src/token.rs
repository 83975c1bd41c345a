use crate::LedgerError;
use rewards_types::{Address, TokenId};

/// Balance and allowance bookkeeping for fungible tokens.
///
/// Every mutating call either applies completely or returns an error and
/// leaves the ledger untouched.
pub trait TokenLedger {
    fn balance_of(&self, token: &TokenId, account: &Address) -> u128;

    fn allowance(&self, token: &TokenId, owner: &Address, spender: &Address) -> u128;

    /// Create `amount` new tokens in `to` (setup and tests only).
    fn mint(&mut self, token: &TokenId, to: &Address, amount: u128) -> Result<(), LedgerError>;

    /// Set the amount `spender` may pull from `owner`, replacing any previous value.
    fn approve(
        &mut self,
        token: &TokenId,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<(), LedgerError>;

    fn transfer(
        &mut self,
        token: &TokenId,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Move `amount` from `owner` to `to` on behalf of `spender`, consuming allowance.
    fn transfer_from(
        &mut self,
        token: &TokenId,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError>;
}

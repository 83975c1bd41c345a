//! In-memory token ledger.

use crate::{LedgerError, TokenLedger};
use rewards_types::{Address, TokenId};
use std::collections::HashMap;

/// Multi-token ledger held in process memory.
///
/// An allowance of `u128::MAX` is treated as unlimited and is never decreased.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    balances: HashMap<(TokenId, Address), u128>,
    allowances: HashMap<(TokenId, Address, Address), u128>,
    supply: HashMap<TokenId, u128>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total minted supply of `token`.
    pub fn total_supply(&self, token: &TokenId) -> u128 {
        self.supply.get(token).copied().unwrap_or(0)
    }

    fn debit_credit(
        &mut self,
        token: &TokenId,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token: token.clone(),
                account: from.clone(),
                needed: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        let to_balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(token.clone()))?;

        self.balances
            .insert((token.clone(), from.clone()), available - amount);
        self.balances.insert((token.clone(), to.clone()), to_balance);
        Ok(())
    }
}

impl TokenLedger for MemoryLedger {
    fn balance_of(&self, token: &TokenId, account: &Address) -> u128 {
        self.balances
            .get(&(token.clone(), account.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn allowance(&self, token: &TokenId, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(token.clone(), owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn mint(&mut self, token: &TokenId, to: &Address, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply(token)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(token.clone()))?;
        // Balance cannot overflow when the supply does not.
        let balance = self.balance_of(token, to) + amount;
        self.supply.insert(token.clone(), supply);
        self.balances.insert((token.clone(), to.clone()), balance);
        Ok(())
    }

    fn approve(
        &mut self,
        token: &TokenId,
        owner: &Address,
        spender: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.allowances
            .insert((token.clone(), owner.clone(), spender.clone()), amount);
        Ok(())
    }

    fn transfer(
        &mut self,
        token: &TokenId,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.debit_credit(token, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        token: &TokenId,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(token, owner, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                token: token.clone(),
                owner: owner.clone(),
                spender: spender.clone(),
                needed: amount,
                available: allowed,
            });
        }
        self.debit_credit(token, owner, to, amount)?;
        if allowed != u128::MAX {
            self.allowances.insert(
                (token.clone(), owner.clone(), spender.clone()),
                allowed - amount,
            );
        }
        Ok(())
    }
}

//! Well-known accounts and a pre-funded ledger.

use rewards_ledger::{LedgerError, MemoryLedger, TokenLedger};
use rewards_types::{Address, TokenId};

pub fn owner() -> Address {
    Address::new("owner")
}

pub fn alice() -> Address {
    Address::new("alice")
}

pub fn bob() -> Address {
    Address::new("bob")
}

pub fn lending_pool() -> Address {
    Address::new("lending-pool")
}

pub fn hook_address() -> Address {
    Address::new("rewards-hook")
}

pub fn reward_token() -> TokenId {
    TokenId::new("RWD")
}

/// A ledger where [`owner`] holds `supply` reward tokens and has approved the
/// hook for all of them.
pub fn funded_ledger(supply: u128) -> Result<MemoryLedger, LedgerError> {
    let mut ledger = MemoryLedger::new();
    ledger.mint(&reward_token(), &owner(), supply)?;
    ledger.approve(&reward_token(), &owner(), &hook_address(), supply)?;
    Ok(ledger)
}

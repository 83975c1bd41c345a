//! Fungible token ledger.
//!
//! The rewards hook never owns token balances itself. It pulls donations in
//! and pays rewards out through the [`TokenLedger`] trait, the same allowance
//! model an ERC-20 style token exposes: `approve` + `transfer_from` for
//! pulls, `transfer` for payouts.
//!
//! [`MemoryLedger`] is the in-process implementation used by the simulator
//! and the tests. One ledger carries any number of tokens.

pub mod error;
pub mod memory;
pub mod token;

pub use error::LedgerError;
pub use memory::MemoryLedger;
pub use token::TokenLedger;

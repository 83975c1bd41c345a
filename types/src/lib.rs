//! Fundamental types for the rewards hook.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account and token identifiers, timestamps, raw token amounts, and the
//! calibration parameters of the accrual engine.

pub mod address;
pub mod amount;
pub mod params;
pub mod time;

pub use address::{Address, TokenId};
pub use amount::{
    format_units, format_wide_units, narrow, parse_ether, parse_units, AmountError, DECIMALS, UNIT,
};
pub use params::{AccessPolicy, BorrowSettlement, HookParams, PrincipalMode};
pub use time::Timestamp;

/// 256-bit unsigned integer for intermediates that outgrow `u128`.
pub use primitive_types::U256;

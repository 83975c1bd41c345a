//! Nullable infrastructure for deterministic testing.
//!
//! The hook takes time and the token ledger as inputs. This crate provides
//! the test-side counterparts:
//! - a clock that only moves when told to
//! - fixed account and token names
//! - a ledger pre-funded the way a deployment script would leave it
//!
//! Nothing here touches the filesystem or reads the system clock.

pub mod clock;
pub mod fixtures;

pub use clock::NullClock;
pub use fixtures::{alice, bob, funded_ledger, hook_address, lending_pool, owner, reward_token};

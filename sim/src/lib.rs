//! Scenario simulator for the rewards hook.
//!
//! A scenario is a TOML file naming the hook parameters, the initial token
//! balances and a list of steps (donations, borrows, claims, clock moves,
//! expectations). [`Simulator`] replays it against a [`RewardsHook`] backed by
//! an in-memory ledger and produces a [`SimReport`].
//!
//! [`RewardsHook`]: rewards_hook::RewardsHook

pub mod config;
pub mod error;
pub mod report;
pub mod scenario;

pub use config::{MintConfig, SimConfig, Step};
pub use error::SimError;
pub use report::SimReport;
pub use scenario::Simulator;

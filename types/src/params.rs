//! Hook parameters: the accrual calibration and the access policy.
//!
//! Every field has a serde default, so a partial TOML table only needs to name
//! what it overrides.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// How `before_borrow` turns the reported amount into the tracked principal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalMode {
    /// Each call reports a new borrow: `principal += amount`.
    #[default]
    Accumulate,
    /// Each call reports the running balance: `principal = amount`.
    Replace,
}

/// What happens to rewards settled during `before_borrow`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowSettlement {
    /// Transfer everything the user has earned so far to the user.
    #[default]
    Payout,
    /// Keep it as unclaimed reward until `claim_rewards`.
    Credit,
}

/// Caller allow-lists. An empty list leaves the operation open to anyone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Who may call `donate`.
    #[serde(default)]
    pub donors: Vec<Address>,

    /// Who may report borrows and claim on behalf of another user
    /// (typically the lending pool).
    #[serde(default)]
    pub borrow_callers: Vec<Address>,
}

impl AccessPolicy {
    /// No restrictions.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn donor_allowed(&self, caller: &Address) -> bool {
        self.donors.is_empty() || self.donors.contains(caller)
    }

    pub fn borrow_caller_allowed(&self, caller: &Address) -> bool {
        self.borrow_callers.is_empty() || self.borrow_callers.contains(caller)
    }
}

/// Parameters of a rewards hook instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookParams {
    /// Fixed-point scale of the per-share reward accumulator.
    #[serde(default = "default_acc_precision")]
    pub acc_precision: u64,

    #[serde(default)]
    pub principal_mode: PrincipalMode,

    #[serde(default)]
    pub borrow_settlement: BorrowSettlement,

    #[serde(default)]
    pub access: AccessPolicy,
}

fn default_acc_precision() -> u64 {
    HookParams::ACC_PRECISION
}

impl HookParams {
    /// Default accumulator scale: 1e12.
    pub const ACC_PRECISION: u64 = 1_000_000_000_000;

    /// Same parameters with a different principal mode.
    pub fn with_principal_mode(mut self, mode: PrincipalMode) -> Self {
        self.principal_mode = mode;
        self
    }

    /// Same parameters with a different borrow settlement.
    pub fn with_borrow_settlement(mut self, settlement: BorrowSettlement) -> Self {
        self.borrow_settlement = settlement;
        self
    }

    /// Same parameters with a different access policy.
    pub fn with_access(mut self, access: AccessPolicy) -> Self {
        self.access = access;
        self
    }
}

impl Default for HookParams {
    fn default() -> Self {
        Self {
            acc_precision: Self::ACC_PRECISION,
            principal_mode: PrincipalMode::default(),
            borrow_settlement: BorrowSettlement::default(),
            access: AccessPolicy::open(),
        }
    }
}

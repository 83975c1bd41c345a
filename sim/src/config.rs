//! Scenario configuration with TOML file support.
//!
//! Amounts are written in whole tokens as decimal strings (`"1000000"`,
//! `"0.5"`), converted at 18 decimals when the scenario runs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use rewards_types::{Address, HookParams, TokenId};
use rewards_utils::LogFormat;

use crate::SimError;

/// A scenario to replay.
///
/// Loaded from a TOML file via [`SimConfig::from_toml_file`] or built
/// programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Clock value, in seconds, when the scenario starts.
    #[serde(default = "default_genesis")]
    pub genesis: u64,

    /// Seconds the clock moves after each transaction (one block).
    #[serde(default = "default_block_time")]
    pub block_time: u64,

    /// Ledger account of the hook.
    #[serde(default = "default_hook_address")]
    pub hook_address: Address,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub params: HookParams,

    /// Initial token balances.
    #[serde(default)]
    pub mints: Vec<MintConfig>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Tokens minted to an account before the first step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintConfig {
    pub account: Address,
    pub token: TokenId,
    pub amount: String,
    /// Also approve the hook to pull the whole amount.
    #[serde(default = "default_true")]
    pub approve_hook: bool,
}

/// One scenario step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Donate {
        from: Address,
        token: TokenId,
        amount: String,
        duration: u64,
    },
    /// Report a borrow. `caller` defaults to the user.
    Borrow {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<Address>,
        user: Address,
        amount: String,
    },
    /// Claim everything owed. `caller` defaults to the user.
    Claim {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<Address>,
        user: Address,
    },
    /// Settle one stream into the user's unclaimed balance.
    Accrue { user: Address, donation: u64 },
    /// Move the clock forward without a transaction.
    Advance { secs: u64 },
    /// Check hook or ledger state. Each given field is compared.
    Expect {
        user: Address,
        #[serde(default)]
        donation: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reward_debt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        balance: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pending: Option<String>,
    },
    /// Log a snapshot of every tracked account.
    Report,
}

impl Step {
    /// Whether the step is a transaction and therefore takes one block.
    pub fn is_transaction(&self) -> bool {
        matches!(
            self,
            Step::Donate { .. } | Step::Borrow { .. } | Step::Claim { .. } | Step::Accrue { .. }
        )
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_genesis() -> u64 {
    1_700_000_000
}

fn default_block_time() -> u64 {
    1
}

fn default_hook_address() -> Address {
    Address::new("rewards-hook")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SimConfig {
    /// Load a scenario from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse a scenario from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SimError> {
        toml::from_str(s).map_err(|e| SimError::Config(e.to_string()))
    }

    /// Serialize the scenario to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, SimError> {
        toml::to_string_pretty(self).map_err(|e| SimError::Config(e.to_string()))
    }

    /// A small ready-to-run scenario: one donation, one borrower.
    pub fn example() -> Self {
        let owner = Address::new("owner");
        let alice = Address::new("alice");
        let token = TokenId::new("RWD");
        Self {
            mints: vec![MintConfig {
                account: owner.clone(),
                token: token.clone(),
                amount: "10000000".into(),
                approve_hook: true,
            }],
            steps: vec![
                Step::Donate {
                    from: owner,
                    token,
                    amount: "1000000".into(),
                    duration: 3600,
                },
                Step::Borrow {
                    caller: None,
                    user: alice.clone(),
                    amount: "100".into(),
                },
                Step::Advance { secs: 3600 },
                Step::Claim {
                    caller: None,
                    user: alice,
                },
                Step::Report,
            ],
            ..Self::default()
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            genesis: default_genesis(),
            block_time: default_block_time(),
            hook_address: default_hook_address(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: HookParams::default(),
            mints: Vec::new(),
            steps: Vec::new(),
        }
    }
}

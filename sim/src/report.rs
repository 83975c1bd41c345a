//! End-of-run report.

use rewards_hook::HookEvent;
use rewards_types::{format_units, format_wide_units, Address, TokenId, DECIMALS, U256};
use rewards_utils::format_duration;
use serde::Serialize;
use std::fmt;

/// Amounts are rendered in whole tokens so the JSON stays exact for any
/// consumer, whatever its integer width.
#[derive(Clone, Debug, Serialize)]
pub struct SimReport {
    pub started_at: u64,
    pub finished_at: u64,
    pub steps: usize,
    pub donations: Vec<DonationReport>,
    pub balances: Vec<BalanceReport>,
    pub positions: Vec<PositionReport>,
    pub events: Vec<HookEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DonationReport {
    pub id: u64,
    pub token: TokenId,
    pub total_amount: String,
    pub reward_rate: String,
    pub duration: u64,
    /// What the truncated rate never releases.
    pub rounding_loss: String,
    pub emitted: String,
    pub credited: String,
    pub unallocated: String,
    pub remaining: String,
    pub finished: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct BalanceReport {
    pub account: Address,
    pub token: TokenId,
    pub balance: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PositionReport {
    pub user: Address,
    pub donation: u64,
    pub principal: String,
    pub reward_debt: String,
    pub unclaimed: String,
    pub pending: String,
}

/// Whole-token rendering used throughout the report.
pub fn tokens(raw: u128) -> String {
    format_units(raw, DECIMALS)
}

/// [`tokens`] for 256-bit figures such as reward debt checkpoints.
pub fn wide_tokens(raw: U256) -> String {
    format_wide_units(raw, DECIMALS)
}

impl SimReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} steps over {}",
            self.steps,
            format_duration(self.finished_at.saturating_sub(self.started_at))
        )?;
        writeln!(f, "donations:")?;
        for d in &self.donations {
            writeln!(
                f,
                "  #{} {} {} over {} (rate {}/s, loss {}) emitted {} credited {} unallocated {} remaining {}{}",
                d.id,
                d.total_amount,
                d.token,
                format_duration(d.duration),
                d.reward_rate,
                d.rounding_loss,
                d.emitted,
                d.credited,
                d.unallocated,
                d.remaining,
                if d.finished { " (finished)" } else { "" }
            )?;
        }
        writeln!(f, "balances:")?;
        for b in &self.balances {
            writeln!(f, "  {:<16} {:>32} {}", b.account, b.balance, b.token)?;
        }
        writeln!(f, "positions:")?;
        for p in &self.positions {
            writeln!(
                f,
                "  {} #{}: principal {} debt {} unclaimed {} pending {}",
                p.user, p.donation, p.principal, p.reward_debt, p.unclaimed, p.pending
            )?;
        }
        write!(f, "{} events", self.events.len())
    }
}

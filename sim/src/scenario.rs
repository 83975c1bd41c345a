//! Scenario replay.

use std::collections::BTreeSet;

use rewards_hook::{HookEvent, RewardsHook};
use rewards_ledger::{MemoryLedger, TokenLedger};
use rewards_types::{parse_ether, Address, Timestamp, TokenId, U256};

use crate::config::{SimConfig, Step};
use crate::report::{
    tokens, wide_tokens, BalanceReport, DonationReport, PositionReport, SimReport,
};
use crate::SimError;

/// Replays a [`SimConfig`] against a hook and an in-memory ledger.
///
/// Each transaction step runs at the current clock value, after which the
/// clock moves by `block_time`.
pub struct Simulator {
    config: SimConfig,
    hook: RewardsHook,
    ledger: MemoryLedger,
    now: Timestamp,
    /// (account, token) pairs shown in the balance report.
    tracked: BTreeSet<(Address, TokenId)>,
    users: BTreeSet<Address>,
    events: Vec<HookEvent>,
    steps_run: usize,
}

fn amount(field: &'static str, value: &str) -> Result<u128, SimError> {
    parse_ether(value).map_err(|source| SimError::Amount {
        field,
        value: value.to_string(),
        source,
    })
}

impl Simulator {
    /// Deploy the hook and apply the initial mints.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let hook = RewardsHook::new(config.hook_address.clone(), config.params.clone())?;
        let mut ledger = MemoryLedger::new();
        let mut tracked = BTreeSet::new();

        for mint in &config.mints {
            let raw = amount("mints.amount", &mint.amount)?;
            ledger.mint(&mint.token, &mint.account, raw)?;
            if mint.approve_hook {
                ledger.approve(&mint.token, &mint.account, hook.address(), raw)?;
            }
            tracked.insert((mint.account.clone(), mint.token.clone()));
            tracked.insert((hook.address().clone(), mint.token.clone()));
            tracing::debug!(account = %mint.account, token = %mint.token, amount = %mint.amount, "minted");
        }

        Ok(Self {
            now: Timestamp::new(config.genesis),
            config,
            hook,
            ledger,
            tracked,
            users: BTreeSet::new(),
            events: Vec::new(),
            steps_run: 0,
        })
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn hook(&self) -> &RewardsHook {
        &self.hook
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    /// Run every step in order and build the report.
    ///
    /// Stops at the first failing step.
    pub fn run(&mut self) -> Result<SimReport, SimError> {
        let steps = self.config.steps.clone();
        for (index, step) in steps.iter().enumerate() {
            if let Err(err) = self.apply(index, step) {
                tracing::warn!(step = index, error = %err, "scenario step failed");
                return Err(err);
            }
        }
        tracing::info!(steps = steps.len(), finished_at = %self.now, "scenario complete");
        self.report()
    }

    /// Apply one step.
    pub fn apply(&mut self, index: usize, step: &Step) -> Result<(), SimError> {
        tracing::debug!(step = index, ?step, at = %self.now, "applying step");
        match step {
            Step::Donate {
                from,
                token,
                amount: value,
                duration,
            } => {
                let raw = amount("donate.amount", value)?;
                let id = self
                    .hook
                    .donate(&mut self.ledger, from, token, raw, *duration, self.now)?;
                self.tracked.insert((from.clone(), token.clone()));
                self.tracked
                    .insert((self.hook.address().clone(), token.clone()));
                tracing::info!(step = index, donation = id, "donated");
            }
            Step::Borrow {
                caller,
                user,
                amount: value,
            } => {
                let raw = amount("borrow.amount", value)?;
                let caller = caller.as_ref().unwrap_or(user);
                let paid = self
                    .hook
                    .before_borrow(&mut self.ledger, caller, user, raw, self.now)?;
                self.track_user(user);
                tracing::info!(step = index, %user, amount = %value, payouts = paid.len(), "borrowed");
            }
            Step::Claim { caller, user } => {
                let caller = caller.as_ref().unwrap_or(user);
                let paid = self
                    .hook
                    .claim_rewards(&mut self.ledger, caller, user, self.now)?;
                self.track_user(user);
                let total: u128 = paid.iter().map(|p| p.amount).sum();
                tracing::info!(step = index, %user, total = %tokens(total), "claimed");
            }
            Step::Accrue { user, donation } => {
                let credited = self.hook.accrue(user, *donation, self.now)?;
                self.track_user(user);
                tracing::info!(step = index, %user, donation, credited = %tokens(credited), "accrued");
            }
            Step::Advance { secs } => {
                self.advance(*secs)?;
            }
            Step::Expect {
                user,
                donation,
                reward_debt,
                balance,
                pending,
            } => self.check(index, user, *donation, reward_debt, balance, pending)?,
            Step::Report => self.log_snapshot(),
        }
        if step.is_transaction() {
            self.advance(self.config.block_time)?;
        }
        self.events.extend(self.hook.take_events());
        self.steps_run += 1;
        Ok(())
    }

    /// Build the report from the current state.
    ///
    /// Fails if a position's pending reward cannot be computed.
    pub fn report(&mut self) -> Result<SimReport, SimError> {
        self.events.extend(self.hook.take_events());

        let mut donations = Vec::new();
        for d in self.hook.donations() {
            let stream = self.hook.stream(d.id)?;
            donations.push(DonationReport {
                id: d.id,
                token: d.token.clone(),
                total_amount: tokens(d.total_amount),
                reward_rate: tokens(d.reward_rate),
                duration: d.duration,
                rounding_loss: tokens(d.rounding_loss()),
                emitted: tokens(d.emitted_by(self.now)),
                credited: tokens(stream.credited),
                unallocated: tokens(stream.unallocated),
                remaining: tokens(d.remaining_emission(self.now)),
                finished: d.is_finished(self.now),
            });
        }

        let balances = self
            .tracked
            .iter()
            .map(|(account, token)| BalanceReport {
                account: account.clone(),
                token: token.clone(),
                balance: tokens(self.ledger.balance_of(token, account)),
            })
            .collect();

        let mut positions = Vec::new();
        for user in &self.users {
            let principal = self.hook.principal_of(user);
            for d in self.hook.donations() {
                let Some(position) = self.hook.position(user, d.id) else {
                    continue;
                };
                let pending = self.hook.pending_rewards(user, d.id, self.now)?;
                positions.push(PositionReport {
                    user: user.clone(),
                    donation: d.id,
                    principal: tokens(principal),
                    reward_debt: wide_tokens(position.reward_debt),
                    unclaimed: tokens(position.unclaimed),
                    pending: tokens(pending),
                });
            }
        }

        Ok(SimReport {
            started_at: self.config.genesis,
            finished_at: self.now.as_secs(),
            steps: self.steps_run,
            donations,
            balances,
            positions,
            events: self.events.clone(),
        })
    }

    fn advance(&mut self, secs: u64) -> Result<(), SimError> {
        self.now = self
            .now
            .checked_add_secs(secs)
            .ok_or_else(|| SimError::Config(format!("clock overflow advancing {secs}s")))?;
        Ok(())
    }

    fn track_user(&mut self, user: &Address) {
        self.users.insert(user.clone());
        for d in self.hook.donations() {
            self.tracked.insert((user.clone(), d.token.clone()));
        }
    }

    fn check(
        &self,
        index: usize,
        user: &Address,
        donation: u64,
        reward_debt: &Option<String>,
        balance: &Option<String>,
        pending: &Option<String>,
    ) -> Result<(), SimError> {
        let token = self.hook.get_donation(donation)?.token.clone();
        let mut checks: Vec<(&str, &String, U256)> = Vec::new();
        if let Some(expected) = reward_debt {
            checks.push((
                "reward_debt",
                expected,
                self.hook.get_user_reward_debt(user, donation)?,
            ));
        }
        if let Some(expected) = balance {
            let actual = self.ledger.balance_of(&token, user);
            checks.push(("balance", expected, U256::from(actual)));
        }
        if let Some(expected) = pending {
            let actual = self.hook.pending_rewards(user, donation, self.now)?;
            checks.push(("pending", expected, U256::from(actual)));
        }

        for (what, expected, actual) in checks {
            let expected_raw = U256::from(amount("expect", expected)?);
            if expected_raw != actual {
                return Err(SimError::ExpectationFailed {
                    step: index,
                    what: format!("{what} of {user} in donation {donation}"),
                    expected: wide_tokens(expected_raw),
                    actual: wide_tokens(actual),
                });
            }
        }
        tracing::info!(step = index, %user, donation, "expectations met");
        Ok(())
    }

    fn log_snapshot(&self) {
        for (account, token) in &self.tracked {
            tracing::info!(
                at = %self.now,
                %account,
                %token,
                balance = %tokens(self.ledger.balance_of(token, account)),
                "balance"
            );
        }
        for user in &self.users {
            tracing::info!(
                at = %self.now,
                %user,
                principal = %tokens(self.hook.principal_of(user)),
                "principal"
            );
        }
    }
}

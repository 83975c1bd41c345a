//! The rewards hook façade.

use crate::accrual::{self, StreamState, UserPosition};
use crate::donation::{Donation, DonationId, DonationRegistry};
use crate::error::HookError;
use crate::event::HookEvent;
use rewards_ledger::TokenLedger;
use rewards_types::{
    Address, BorrowSettlement, HookParams, PrincipalMode, Timestamp, TokenId, U256,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A reward transfer made by the hook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub donation: DonationId,
    pub token: TokenId,
    pub amount: u128,
}

/// One position after settlement, before commit.
struct Settled {
    donation: DonationId,
    position: UserPosition,
    earned: u128,
}

/// Every change a call wants to make, computed on copies.
struct SettlePlan {
    streams: Vec<StreamState>,
    settled: Vec<Settled>,
}

/// Donation registry, accrual engine and borrow/claim settlement.
///
/// Every mutating call either commits all of its changes or returns an error
/// with the hook and the ledger untouched. Token movements go through the
/// ledger passed into each call; the hook's own holdings sit at `address`.
pub struct RewardsHook {
    address: Address,
    params: HookParams,
    registry: DonationRegistry,
    principals: HashMap<Address, u128>,
    total_principal: u128,
    positions: HashMap<(Address, DonationId), UserPosition>,
    events: Vec<HookEvent>,
}

impl RewardsHook {
    pub fn new(address: Address, params: HookParams) -> Result<Self, HookError> {
        if !address.is_valid() {
            return Err(HookError::InvalidArgument(format!(
                "invalid hook address {address:?}"
            )));
        }
        if params.acc_precision == 0 {
            return Err(HookError::InvalidArgument(
                "accumulator precision must be non-zero".into(),
            ));
        }
        Ok(Self {
            address,
            params,
            registry: DonationRegistry::new(),
            principals: HashMap::new(),
            total_principal: 0,
            positions: HashMap::new(),
            events: Vec::new(),
        })
    }

    /// The ledger account holding donated tokens.
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn params(&self) -> &HookParams {
        &self.params
    }

    fn precision(&self) -> u128 {
        u128::from(self.params.acc_precision)
    }

    // ── Donations ────────────────────────────────────────────────────────

    /// Fund a new stream releasing `amount` of `token` over `duration` seconds
    /// from `now`. Pulls the tokens from `caller`, which must have approved
    /// the hook beforehand.
    ///
    /// `amount * acc_precision` must fit in `u128`; larger donations are
    /// rejected up front because their accumulator could outgrow the
    /// settlement arithmetic.
    pub fn donate(
        &mut self,
        ledger: &mut dyn TokenLedger,
        caller: &Address,
        token: &TokenId,
        amount: u128,
        duration: u64,
        now: Timestamp,
    ) -> Result<DonationId, HookError> {
        if !self.params.access.donor_allowed(caller) {
            return Err(HookError::Unauthorized {
                caller: caller.clone(),
                action: "donate",
            });
        }
        let donation = Donation::new(
            self.registry.next_id(),
            caller.clone(),
            token.clone(),
            amount,
            duration,
            now,
        )?;
        if amount.checked_mul(self.precision()).is_none() {
            return Err(HookError::InvalidArgument(format!(
                "donation of {amount} exceeds the accumulator range at precision {}",
                self.params.acc_precision
            )));
        }
        ledger.transfer_from(token, &self.address, caller, &self.address, amount)?;

        let event = HookEvent::Donated {
            donation: donation.id,
            donor: caller.clone(),
            token: token.clone(),
            amount,
            duration,
            reward_rate: donation.reward_rate,
            start_time: now,
        };
        tracing::info!(
            donation = donation.id,
            donor = %caller,
            %token,
            amount,
            duration,
            reward_rate = donation.reward_rate,
            "donation received"
        );
        let id = self.registry.push(donation)?;
        self.events.push(event);
        Ok(id)
    }

    pub fn get_donation(&self, id: DonationId) -> Result<&Donation, HookError> {
        self.registry.get(id).ok_or(HookError::DonationNotFound(id))
    }

    pub fn get_donation_count(&self) -> u64 {
        self.registry.count()
    }

    pub fn donations(&self) -> impl Iterator<Item = &Donation> {
        self.registry.iter()
    }

    pub fn stream(&self, id: DonationId) -> Result<&StreamState, HookError> {
        self.registry.stream(id).ok_or(HookError::DonationNotFound(id))
    }

    /// Emission of donation `id` still to come after `now`.
    pub fn remaining_emission(&self, id: DonationId, now: Timestamp) -> Result<u128, HookError> {
        Ok(self.get_donation(id)?.remaining_emission(now))
    }

    // ── Borrowing ────────────────────────────────────────────────────────

    /// Report a borrow by `user`.
    ///
    /// Settles every stream at the user's previous principal, then applies the
    /// new one according to [`PrincipalMode`]. With
    /// [`BorrowSettlement::Payout`] the settled reward is transferred to the
    /// user and returned; with [`BorrowSettlement::Credit`] it is kept as
    /// unclaimed and the returned list is empty.
    pub fn before_borrow(
        &mut self,
        ledger: &mut dyn TokenLedger,
        caller: &Address,
        user: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<Vec<Payout>, HookError> {
        self.authorize_borrow_caller(caller, "before_borrow")?;
        let precision = self.precision();
        let previous = self.principal_of(user);
        let mut plan = self.settle_all(user, previous, now, true)?;

        let principal = match self.params.principal_mode {
            PrincipalMode::Accumulate => previous
                .checked_add(amount)
                .ok_or(HookError::ArithmeticOverflow)?,
            PrincipalMode::Replace => amount,
        };
        let total_principal = self
            .total_principal
            .checked_sub(previous)
            .and_then(|rest| rest.checked_add(principal))
            .ok_or(HookError::ArithmeticOverflow)?;

        for settled in &mut plan.settled {
            let acc = plan.streams[settled.donation as usize].acc_reward_per_share;
            settled.position.reward_debt = accrual::accumulated(principal, acc, precision)?;
        }

        let mut events = Vec::new();
        let payouts = match self.params.borrow_settlement {
            BorrowSettlement::Payout => {
                let payouts = self.collect_payouts(&mut plan, false)?;
                self.ensure_funds(ledger, &payouts)?;
                self.pay_all(ledger, user, &payouts)?;
                events.extend(payouts.iter().map(|p| HookEvent::RewardPaid {
                    user: user.clone(),
                    donation: p.donation,
                    token: p.token.clone(),
                    amount: p.amount,
                    at: now,
                }));
                payouts
            }
            BorrowSettlement::Credit => {
                events.extend(self.credit_earned(user, &mut plan, now)?);
                Vec::new()
            }
        };
        events.push(HookEvent::PrincipalUpdated {
            user: user.clone(),
            previous,
            principal,
            total_principal,
            at: now,
        });

        self.commit(user, plan)?;
        if principal == 0 {
            self.principals.remove(user);
        } else {
            self.principals.insert(user.clone(), principal);
        }
        self.total_principal = total_principal;
        self.events.extend(events);

        tracing::info!(
            %user,
            previous,
            principal,
            total_principal,
            paid = payouts.len(),
            "borrow recorded"
        );
        Ok(payouts)
    }

    // ── Claiming ─────────────────────────────────────────────────────────

    /// Settle every stream for `user` and transfer everything owed.
    ///
    /// A user may always claim for themselves; claiming on behalf of someone
    /// else requires being an allowed borrow caller.
    pub fn claim_rewards(
        &mut self,
        ledger: &mut dyn TokenLedger,
        caller: &Address,
        user: &Address,
        now: Timestamp,
    ) -> Result<Vec<Payout>, HookError> {
        if caller != user {
            self.authorize_borrow_caller(caller, "claim_rewards")?;
        }
        let principal = self.principal_of(user);
        let mut plan = self.settle_all(user, principal, now, principal > 0)?;
        let payouts = self.collect_payouts(&mut plan, true)?;

        if let Err(err) = self.ensure_funds(ledger, &payouts) {
            tracing::warn!(%user, error = %err, "claim rejected");
            return Err(err);
        }
        self.pay_all(ledger, user, &payouts)?;

        self.commit(user, plan)?;
        self.events.extend(payouts.iter().map(|p| HookEvent::RewardPaid {
            user: user.clone(),
            donation: p.donation,
            token: p.token.clone(),
            amount: p.amount,
            at: now,
        }));

        tracing::info!(
            %user,
            payouts = payouts.len(),
            total = payouts.iter().map(|p| p.amount).sum::<u128>(),
            "rewards claimed"
        );
        Ok(payouts)
    }

    /// Settle a single stream for `user` into its unclaimed balance.
    ///
    /// Moves no tokens. Returns the amount credited.
    pub fn accrue(
        &mut self,
        user: &Address,
        id: DonationId,
        now: Timestamp,
    ) -> Result<u128, HookError> {
        let donation = self.get_donation(id)?;
        let mut stream = self.stream(id)?.clone();
        let mut position = self.position_or_new(user, donation);
        let earned = accrual::accrue(
            donation,
            &mut stream,
            &mut position,
            self.principal_of(user),
            self.total_principal,
            now,
            self.precision(),
        )?;
        position.unclaimed = position
            .unclaimed
            .checked_add(earned)
            .ok_or(HookError::ArithmeticOverflow)?;

        self.registry.set_stream(id, stream)?;
        self.positions.insert((user.clone(), id), position);
        if earned > 0 {
            self.events.push(HookEvent::RewardCredited {
                user: user.clone(),
                donation: id,
                amount: earned,
                at: now,
            });
        }
        tracing::debug!(%user, donation = id, earned, "position accrued");
        Ok(earned)
    }

    // ── Views ────────────────────────────────────────────────────────────

    /// The position's `reward_debt` checkpoint. Does not accrue.
    ///
    /// 256-bit: after a dust principal has inflated the accumulator, a large
    /// borrower's checkpoint no longer fits in `u128`.
    pub fn get_user_reward_debt(&self, user: &Address, id: DonationId) -> Result<U256, HookError> {
        self.get_donation(id)?;
        Ok(self
            .positions
            .get(&(user.clone(), id))
            .map_or(U256::zero(), |p| p.reward_debt))
    }

    /// What `claim_rewards` would pay `user` from donation `id` at `now`.
    pub fn pending_rewards(
        &self,
        user: &Address,
        id: DonationId,
        now: Timestamp,
    ) -> Result<u128, HookError> {
        let donation = self.get_donation(id)?;
        let principal = self.principal_of(user);
        let position = match self.positions.get(&(user.clone(), id)) {
            Some(position) => position.clone(),
            None if principal > 0 => UserPosition::new(donation.start_time),
            None => return Ok(0),
        };
        let mut stream = self.stream(id)?.clone();
        let precision = self.precision();
        accrual::update_stream(donation, &mut stream, self.total_principal, now, precision)?;
        let owed = accrual::pending(principal, &stream, &position, precision)?;
        position
            .unclaimed
            .checked_add(owed)
            .ok_or(HookError::ArithmeticOverflow)
    }

    pub fn position(&self, user: &Address, id: DonationId) -> Option<&UserPosition> {
        self.positions.get(&(user.clone(), id))
    }

    pub fn principal_of(&self, user: &Address) -> u128 {
        self.principals.get(user).copied().unwrap_or(0)
    }

    pub fn total_principal(&self) -> u128 {
        self.total_principal
    }

    /// Drain the recorded events.
    pub fn take_events(&mut self) -> Vec<HookEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn authorize_borrow_caller(&self, caller: &Address, action: &'static str) -> Result<(), HookError> {
        if self.params.access.borrow_caller_allowed(caller) {
            Ok(())
        } else {
            Err(HookError::Unauthorized {
                caller: caller.clone(),
                action,
            })
        }
    }

    fn position_or_new(&self, user: &Address, donation: &Donation) -> UserPosition {
        self.positions
            .get(&(user.clone(), donation.id))
            .cloned()
            .unwrap_or_else(|| UserPosition::new(donation.start_time))
    }

    /// Bring every stream forward and settle `user` at `principal`.
    ///
    /// Donations the user has no position in are skipped unless
    /// `create_missing` is set.
    fn settle_all(
        &self,
        user: &Address,
        principal: u128,
        now: Timestamp,
        create_missing: bool,
    ) -> Result<SettlePlan, HookError> {
        let precision = self.precision();
        let mut streams = self.registry.streams().to_vec();
        let mut settled = Vec::new();

        for (donation, stream) in self.registry.iter().zip(streams.iter_mut()) {
            let mut position = match self.positions.get(&(user.clone(), donation.id)) {
                Some(position) => position.clone(),
                None if create_missing => UserPosition::new(donation.start_time),
                None => continue,
            };
            let earned = accrual::accrue(
                donation,
                stream,
                &mut position,
                principal,
                self.total_principal,
                now,
                precision,
            )?;
            tracing::debug!(%user, donation = donation.id, earned, "position settled");
            settled.push(Settled {
                donation: donation.id,
                position,
                earned,
            });
        }
        Ok(SettlePlan { streams, settled })
    }

    /// Turn settled earnings (and, when `include_unclaimed`, the unclaimed
    /// balances) into payouts, zeroing what is paid.
    fn collect_payouts(
        &self,
        plan: &mut SettlePlan,
        include_unclaimed: bool,
    ) -> Result<Vec<Payout>, HookError> {
        let mut payouts = Vec::new();
        for settled in &mut plan.settled {
            let mut amount = settled.earned;
            if include_unclaimed {
                amount = amount
                    .checked_add(settled.position.unclaimed)
                    .ok_or(HookError::ArithmeticOverflow)?;
                settled.position.unclaimed = 0;
            }
            settled.earned = 0;
            if amount == 0 {
                continue;
            }
            let donation = self.get_donation(settled.donation)?;
            payouts.push(Payout {
                donation: donation.id,
                token: donation.token.clone(),
                amount,
            });
        }
        Ok(payouts)
    }

    fn credit_earned(
        &self,
        user: &Address,
        plan: &mut SettlePlan,
        now: Timestamp,
    ) -> Result<Vec<HookEvent>, HookError> {
        let mut events = Vec::new();
        for settled in &mut plan.settled {
            if settled.earned == 0 {
                continue;
            }
            settled.position.unclaimed = settled
                .position
                .unclaimed
                .checked_add(settled.earned)
                .ok_or(HookError::ArithmeticOverflow)?;
            events.push(HookEvent::RewardCredited {
                user: user.clone(),
                donation: settled.donation,
                amount: settled.earned,
                at: now,
            });
            settled.earned = 0;
        }
        Ok(events)
    }

    /// Check the hook can cover every payout, summed per token.
    fn ensure_funds(&self, ledger: &dyn TokenLedger, payouts: &[Payout]) -> Result<(), HookError> {
        let mut needed: BTreeMap<&TokenId, u128> = BTreeMap::new();
        for payout in payouts {
            let total = needed.entry(&payout.token).or_insert(0);
            *total = total
                .checked_add(payout.amount)
                .ok_or(HookError::ArithmeticOverflow)?;
        }
        for (token, needed) in needed {
            let available = ledger.balance_of(token, &self.address);
            if available < needed {
                return Err(HookError::InsufficientBalance {
                    token: token.clone(),
                    needed,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Transfer every payout to `user`. On failure, transfers already made
    /// are sent back before the error is returned. If sending one back fails
    /// as well, the ledger is left part-paid and
    /// [`HookError::RollbackFailed`] carries both failures.
    fn pay_all(
        &self,
        ledger: &mut dyn TokenLedger,
        user: &Address,
        payouts: &[Payout],
    ) -> Result<(), HookError> {
        for (i, payout) in payouts.iter().enumerate() {
            if let Err(err) = ledger.transfer(&payout.token, &self.address, user, payout.amount) {
                tracing::warn!(
                    %user,
                    donation = payout.donation,
                    error = %err,
                    "payout failed, reverting earlier transfers"
                );
                let mut revert_failure = None;
                for done in payouts[..i].iter().rev() {
                    if let Err(revert) = ledger.transfer(&done.token, user, &self.address, done.amount) {
                        tracing::error!(%user, donation = done.donation, error = %revert, "revert failed");
                        revert_failure.get_or_insert(revert);
                    }
                }
                return Err(match revert_failure {
                    Some(revert) => HookError::RollbackFailed {
                        payout: err,
                        revert,
                    },
                    None => err.into(),
                });
            }
        }
        Ok(())
    }

    fn commit(&mut self, user: &Address, plan: SettlePlan) -> Result<(), HookError> {
        self.registry.replace_streams(plan.streams)?;
        for settled in plan.settled {
            self.positions
                .insert((user.clone(), settled.donation), settled.position);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewards_ledger::{LedgerError, MemoryLedger};
    use rewards_types::{AccessPolicy, UNIT};

    fn hook_addr() -> Address {
        Address::new("hook")
    }

    fn owner() -> Address {
        Address::new("owner")
    }

    fn alice() -> Address {
        Address::new("alice")
    }

    fn bob() -> Address {
        Address::new("bob")
    }

    fn rwd() -> TokenId {
        TokenId::new("RWD")
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    /// A hook with `params` and a ledger where the owner holds and has
    /// approved ten million reward tokens.
    fn make_hook(params: HookParams) -> (RewardsHook, MemoryLedger) {
        let hook = RewardsHook::new(hook_addr(), params).unwrap();
        let mut ledger = MemoryLedger::new();
        ledger.mint(&rwd(), &owner(), 10_000_000 * UNIT).unwrap();
        ledger
            .approve(&rwd(), &owner(), &hook_addr(), 10_000_000 * UNIT)
            .unwrap();
        (hook, ledger)
    }

    #[test]
    fn new_rejects_bad_arguments() {
        assert!(matches!(
            RewardsHook::new(Address::new(""), HookParams::default()),
            Err(HookError::InvalidArgument(_))
        ));
        let params = HookParams {
            acc_precision: 0,
            ..HookParams::default()
        };
        assert!(matches!(
            RewardsHook::new(hook_addr(), params),
            Err(HookError::InvalidArgument(_))
        ));
    }

    #[test]
    fn donate_pulls_tokens_and_records_stream() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        let id = hook
            .donate(&mut ledger, &owner(), &rwd(), 1_000_000 * UNIT, 3600, ts(100))
            .unwrap();
        assert_eq!(id, 0);
        assert_eq!(hook.get_donation_count(), 1);
        let donation = hook.get_donation(0).unwrap();
        assert_eq!(donation.reward_rate, 1_000_000 * UNIT / 3600);
        assert_eq!(donation.end_time, ts(3700));
        assert_eq!(ledger.balance_of(&rwd(), &hook_addr()), 1_000_000 * UNIT);
        assert_eq!(ledger.balance_of(&rwd(), &owner()), 9_000_000 * UNIT);

        let events = hook.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], HookEvent::Donated { donation: 0, .. }));
        assert!(hook.take_events().is_empty());
    }

    #[test]
    fn donate_validation_leaves_state_untouched() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        let result = hook.donate(&mut ledger, &owner(), &rwd(), 0, 3600, ts(0));
        assert!(matches!(result, Err(HookError::InvalidArgument(_))));
        let result = hook.donate(&mut ledger, &owner(), &rwd(), 100, 0, ts(0));
        assert!(matches!(result, Err(HookError::InvalidArgument(_))));
        assert_eq!(hook.get_donation_count(), 0);
        assert_eq!(ledger.balance_of(&rwd(), &hook_addr()), 0);
    }

    #[test]
    fn donate_beyond_accumulator_range_is_rejected() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        let too_big = u128::MAX / 1_000_000_000_000 + 1;
        ledger.mint(&rwd(), &alice(), too_big).unwrap();
        ledger.approve(&rwd(), &alice(), &hook_addr(), u128::MAX).unwrap();
        let result = hook.donate(&mut ledger, &alice(), &rwd(), too_big, 3600, ts(0));
        assert!(matches!(result, Err(HookError::InvalidArgument(_))));
        assert_eq!(hook.get_donation_count(), 0);
        assert_eq!(ledger.balance_of(&rwd(), &alice()), too_big);

        hook.donate(&mut ledger, &alice(), &rwd(), too_big - 1, 3600, ts(0))
            .unwrap();
    }

    #[test]
    fn donate_without_allowance_fails() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        ledger.mint(&rwd(), &alice(), 500).unwrap();
        let result = hook.donate(&mut ledger, &alice(), &rwd(), 500, 10, ts(0));
        match result.unwrap_err() {
            HookError::Ledger(LedgerError::InsufficientAllowance { needed, available, .. }) => {
                assert_eq!(needed, 500);
                assert_eq!(available, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hook.get_donation_count(), 0);
    }

    #[test]
    fn unknown_donation_is_not_found() {
        let (hook, _) = make_hook(HookParams::default());
        assert!(matches!(hook.get_donation(0), Err(HookError::DonationNotFound(0))));
        assert!(matches!(
            hook.get_user_reward_debt(&alice(), 3),
            Err(HookError::DonationNotFound(3))
        ));
        assert!(matches!(
            hook.pending_rewards(&alice(), 1, ts(0)),
            Err(HookError::DonationNotFound(1))
        ));
    }

    #[test]
    fn first_borrow_creates_positions() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        hook.donate(&mut ledger, &owner(), &rwd(), 1_000 * UNIT, 100, ts(0))
            .unwrap();
        hook.donate(&mut ledger, &owner(), &rwd(), 2_000 * UNIT, 100, ts(0))
            .unwrap();
        let paid = hook
            .before_borrow(&mut ledger, &alice(), &alice(), 10 * UNIT, ts(1))
            .unwrap();
        assert!(paid.is_empty());
        assert!(hook.position(&alice(), 0).is_some());
        assert!(hook.position(&alice(), 1).is_some());
        assert_eq!(hook.principal_of(&alice()), 10 * UNIT);
        assert_eq!(hook.total_principal(), 10 * UNIT);
        assert!(hook.get_user_reward_debt(&alice(), 0).unwrap().is_zero());
    }

    #[test]
    fn sole_borrower_receives_whole_emission() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        hook.donate(&mut ledger, &owner(), &rwd(), 1_000, 10, ts(0))
            .unwrap();
        hook.before_borrow(&mut ledger, &alice(), &alice(), 8, ts(0))
            .unwrap();
        assert_eq!(hook.pending_rewards(&alice(), 0, ts(4)).unwrap(), 400);
        let paid = hook.claim_rewards(&mut ledger, &alice(), &alice(), ts(20)).unwrap();
        assert_eq!(
            paid,
            vec![Payout {
                donation: 0,
                token: rwd(),
                amount: 1_000
            }]
        );
        assert_eq!(ledger.balance_of(&rwd(), &alice()), 1_000);
        assert_eq!(hook.pending_rewards(&alice(), 0, ts(30)).unwrap(), 0);
    }

    #[test]
    fn borrowers_share_in_proportion_to_principal() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        hook.donate(&mut ledger, &owner(), &rwd(), 9_000, 90, ts(0))
            .unwrap();
        hook.before_borrow(&mut ledger, &alice(), &alice(), 1, ts(0))
            .unwrap();
        hook.before_borrow(&mut ledger, &bob(), &bob(), 2, ts(0))
            .unwrap();
        hook.claim_rewards(&mut ledger, &alice(), &alice(), ts(90))
            .unwrap();
        hook.claim_rewards(&mut ledger, &bob(), &bob(), ts(90))
            .unwrap();
        assert_eq!(ledger.balance_of(&rwd(), &alice()), 3_000);
        assert_eq!(ledger.balance_of(&rwd(), &bob()), 6_000);
        assert_eq!(ledger.balance_of(&rwd(), &hook_addr()), 0);
    }

    #[test]
    fn credit_mode_keeps_reward_unclaimed() {
        let params = HookParams::default().with_borrow_settlement(BorrowSettlement::Credit);
        let (mut hook, mut ledger) = make_hook(params);
        hook.donate(&mut ledger, &owner(), &rwd(), 1_000, 10, ts(0))
            .unwrap();
        hook.before_borrow(&mut ledger, &alice(), &alice(), 5, ts(0))
            .unwrap();
        let paid = hook
            .before_borrow(&mut ledger, &alice(), &alice(), 5, ts(3))
            .unwrap();
        assert!(paid.is_empty());
        assert_eq!(ledger.balance_of(&rwd(), &alice()), 0);
        assert_eq!(hook.position(&alice(), 0).unwrap().unclaimed, 300);

        let events = hook.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            HookEvent::RewardCredited { amount: 300, .. }
        )));

        let paid = hook.claim_rewards(&mut ledger, &alice(), &alice(), ts(10)).unwrap();
        assert_eq!(paid[0].amount, 1_000);
        assert_eq!(hook.position(&alice(), 0).unwrap().unclaimed, 0);
    }

    #[test]
    fn replace_mode_sets_running_balance() {
        let params = HookParams::default().with_principal_mode(PrincipalMode::Replace);
        let (mut hook, mut ledger) = make_hook(params);
        hook.before_borrow(&mut ledger, &alice(), &alice(), 50, ts(0))
            .unwrap();
        hook.before_borrow(&mut ledger, &alice(), &alice(), 20, ts(1))
            .unwrap();
        assert_eq!(hook.principal_of(&alice()), 20);
        assert_eq!(hook.total_principal(), 20);
        hook.before_borrow(&mut ledger, &alice(), &alice(), 0, ts(2))
            .unwrap();
        assert_eq!(hook.principal_of(&alice()), 0);
        assert_eq!(hook.total_principal(), 0);
    }

    #[test]
    fn accrue_credits_without_transfer() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        hook.donate(&mut ledger, &owner(), &rwd(), 1_000, 10, ts(0))
            .unwrap();
        hook.before_borrow(&mut ledger, &alice(), &alice(), 1, ts(0))
            .unwrap();
        assert_eq!(hook.accrue(&alice(), 0, ts(5)).unwrap(), 500);
        assert_eq!(hook.accrue(&alice(), 0, ts(5)).unwrap(), 0);
        assert_eq!(ledger.balance_of(&rwd(), &alice()), 0);
        assert_eq!(hook.pending_rewards(&alice(), 0, ts(5)).unwrap(), 500);
        assert!(matches!(
            hook.accrue(&alice(), 4, ts(5)),
            Err(HookError::DonationNotFound(4))
        ));
    }

    #[test]
    fn access_lists_are_enforced() {
        let access = AccessPolicy {
            donors: vec![owner()],
            borrow_callers: vec![Address::new("pool")],
        };
        let (mut hook, mut ledger) = make_hook(HookParams::default().with_access(access));
        ledger.mint(&rwd(), &alice(), 100).unwrap();
        ledger.approve(&rwd(), &alice(), &hook_addr(), 100).unwrap();

        match hook
            .donate(&mut ledger, &alice(), &rwd(), 100, 10, ts(0))
            .unwrap_err()
        {
            HookError::Unauthorized { caller, action } => {
                assert_eq!(caller, alice());
                assert_eq!(action, "donate");
            }
            other => panic!("unexpected error: {other}"),
        }
        hook.donate(&mut ledger, &owner(), &rwd(), 1_000, 10, ts(0))
            .unwrap();

        assert!(matches!(
            hook.before_borrow(&mut ledger, &alice(), &alice(), 1, ts(0)),
            Err(HookError::Unauthorized { action: "before_borrow", .. })
        ));
        hook.before_borrow(&mut ledger, &Address::new("pool"), &alice(), 1, ts(0))
            .unwrap();

        assert!(matches!(
            hook.claim_rewards(&mut ledger, &bob(), &alice(), ts(5)),
            Err(HookError::Unauthorized { action: "claim_rewards", .. })
        ));
        hook.claim_rewards(&mut ledger, &alice(), &alice(), ts(5))
            .unwrap();
        assert_eq!(ledger.balance_of(&rwd(), &alice()), 500);
    }

    #[test]
    fn claim_with_short_funds_changes_nothing() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        hook.donate(&mut ledger, &owner(), &rwd(), 1_000, 10, ts(0))
            .unwrap();
        hook.before_borrow(&mut ledger, &alice(), &alice(), 1, ts(0))
            .unwrap();
        // Drain the hook's holdings behind its back.
        ledger
            .transfer(&rwd(), &hook_addr(), &owner(), 1_000)
            .unwrap();
        let stream_before = hook.stream(0).unwrap().clone();

        match hook
            .claim_rewards(&mut ledger, &alice(), &alice(), ts(10))
            .unwrap_err()
        {
            HookError::InsufficientBalance { needed, available, .. } => {
                assert_eq!(needed, 1_000);
                assert_eq!(available, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hook.stream(0).unwrap(), &stream_before);
        assert_eq!(hook.pending_rewards(&alice(), 0, ts(10)).unwrap(), 1_000);
    }

    #[test]
    fn rewards_with_no_borrower_stay_in_hook() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        hook.donate(&mut ledger, &owner(), &rwd(), 1_000, 10, ts(0))
            .unwrap();
        hook.before_borrow(&mut ledger, &alice(), &alice(), 1, ts(4))
            .unwrap();
        hook.claim_rewards(&mut ledger, &alice(), &alice(), ts(10))
            .unwrap();
        assert_eq!(ledger.balance_of(&rwd(), &alice()), 600);
        assert_eq!(hook.stream(0).unwrap().unallocated, 400);
        assert_eq!(ledger.balance_of(&rwd(), &hook_addr()), 400);
    }

    #[test]
    fn late_donation_pays_existing_borrower() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        hook.before_borrow(&mut ledger, &alice(), &alice(), 1, ts(0))
            .unwrap();
        hook.donate(&mut ledger, &owner(), &rwd(), 1_000, 10, ts(5))
            .unwrap();
        assert!(hook.position(&alice(), 0).is_none());
        assert_eq!(hook.pending_rewards(&alice(), 0, ts(10)).unwrap(), 500);
        let paid = hook.claim_rewards(&mut ledger, &alice(), &alice(), ts(15)).unwrap();
        assert_eq!(paid[0].amount, 1_000);
        assert!(hook.position(&alice(), 0).is_some());
    }

    #[test]
    fn events_serialize_to_json() {
        let (mut hook, mut ledger) = make_hook(HookParams::default());
        hook.donate(&mut ledger, &owner(), &rwd(), 1_000, 10, ts(0))
            .unwrap();
        let events = hook.take_events();
        let json = serde_json::to_string(&events[0]).unwrap();
        assert!(json.contains("\"donated\""));
        let back: HookEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, events[0]);
    }
}

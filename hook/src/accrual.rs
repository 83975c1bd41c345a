//! Time-weighted reward accrual.
//!
//! Each stream keeps a reward-per-share accumulator. Bringing a stream
//! forward adds `elapsed * reward_rate * precision / total_principal` to it,
//! so a borrower holding `principal` has earned
//! `principal * acc / precision` since the stream started. A position stores
//! that figure as its `reward_debt` checkpoint whenever it is settled, and the
//! difference to the current figure is what is owed.
//!
//! A dust principal can push `acc_reward_per_share` far beyond what
//! `principal * acc` leaves room for in `u128`, so the accumulator and the
//! checkpoints are 256-bit. Donations are capped so that
//! `total_amount * precision` fits in `u128`, which bounds the accumulator by
//! the same figure and keeps every product within 256 bits. Amounts leave
//! this module as `u128` only after the release clamp. Division truncates and
//! every operation is checked.

use crate::donation::Donation;
use crate::error::HookError;
use rewards_types::{narrow, Timestamp, U256};
use serde::{Deserialize, Serialize};

/// Mutable accounting for one donation stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamState {
    /// Reward released per unit of principal, scaled by the accumulator precision.
    pub acc_reward_per_share: U256,
    /// The stream has been brought forward up to here.
    pub last_reward_time: Timestamp,
    /// Emission released while at least one borrower held principal.
    pub released: u128,
    /// Emission that fell into intervals with no principal outstanding.
    /// It stays in the hook.
    pub unallocated: u128,
    /// Reward credited to borrowers so far. Never exceeds `released`.
    pub credited: u128,
}

impl StreamState {
    pub fn new(start_time: Timestamp) -> Self {
        Self {
            last_reward_time: start_time,
            ..Self::default()
        }
    }
}

/// One borrower's standing in one stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    /// `principal * acc_reward_per_share / precision` at the last settlement.
    pub reward_debt: U256,
    /// Credited but not yet transferred.
    pub unclaimed: u128,
    pub last_update_time: Timestamp,
}

impl UserPosition {
    pub fn new(start_time: Timestamp) -> Self {
        Self {
            last_update_time: start_time,
            ..Self::default()
        }
    }
}

/// `min(now, end_time)`.
pub fn last_time_reward_applicable(donation: &Donation, now: Timestamp) -> Timestamp {
    now.min(donation.end_time)
}

/// Bring `stream` forward to `now` at the given total principal.
///
/// A no-op when the stream is already caught up, which makes repeated calls
/// at the same `now` and any call after the window has closed harmless.
pub fn update_stream(
    donation: &Donation,
    stream: &mut StreamState,
    total_principal: u128,
    now: Timestamp,
    precision: u128,
) -> Result<(), HookError> {
    let applicable = last_time_reward_applicable(donation, now);
    if applicable <= stream.last_reward_time {
        return Ok(());
    }
    let elapsed = u128::from(stream.last_reward_time.elapsed_since(applicable));
    let emitted = elapsed
        .checked_mul(donation.reward_rate)
        .ok_or(HookError::ArithmeticOverflow)?;

    if total_principal == 0 {
        stream.unallocated = stream
            .unallocated
            .checked_add(emitted)
            .ok_or(HookError::ArithmeticOverflow)?;
    } else {
        let delta = U256::from(emitted)
            .checked_mul(U256::from(precision))
            .ok_or(HookError::ArithmeticOverflow)?
            / U256::from(total_principal);
        stream.acc_reward_per_share = stream
            .acc_reward_per_share
            .checked_add(delta)
            .ok_or(HookError::ArithmeticOverflow)?;
        stream.released = stream
            .released
            .checked_add(emitted)
            .ok_or(HookError::ArithmeticOverflow)?;
    }
    stream.last_reward_time = applicable;
    Ok(())
}

/// `principal * acc / precision`.
pub fn accumulated(principal: u128, acc_reward_per_share: U256, precision: u128) -> Result<U256, HookError> {
    U256::from(principal)
        .checked_mul(acc_reward_per_share)
        .map(|scaled| scaled / U256::from(precision))
        .ok_or(HookError::ArithmeticOverflow)
}

/// What `position` has earned since its checkpoint, without touching anything.
///
/// Clamped to what the stream has released but not yet credited, so
/// truncation can never let borrowers collectively take more than was emitted.
pub fn pending(
    principal: u128,
    stream: &StreamState,
    position: &UserPosition,
    precision: u128,
) -> Result<u128, HookError> {
    let owed = accumulated(principal, stream.acc_reward_per_share, precision)?
        .checked_sub(position.reward_debt)
        .ok_or(HookError::ArithmeticOverflow)?;
    let available = stream.released.saturating_sub(stream.credited);
    Ok(narrow(owed).map_or(available, |owed| owed.min(available)))
}

/// Bring the stream forward and settle `position` at `principal`.
///
/// Returns the amount earned since the last settlement. The caller decides
/// whether it is paid out or added to `unclaimed`.
pub fn accrue(
    donation: &Donation,
    stream: &mut StreamState,
    position: &mut UserPosition,
    principal: u128,
    total_principal: u128,
    now: Timestamp,
    precision: u128,
) -> Result<u128, HookError> {
    update_stream(donation, stream, total_principal, now, precision)?;
    let earned = pending(principal, stream, position, precision)?;
    stream.credited = stream
        .credited
        .checked_add(earned)
        .ok_or(HookError::ArithmeticOverflow)?;
    position.reward_debt = accumulated(principal, stream.acc_reward_per_share, precision)?;
    position.last_update_time = position.last_update_time.max(stream.last_reward_time);
    Ok(earned)
}

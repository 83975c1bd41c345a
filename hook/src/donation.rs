//! Donations and the append-only registry that holds them.

use crate::accrual::StreamState;
use crate::error::HookError;
use rewards_types::{Address, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

/// Sequential donation index, starting at 0.
pub type DonationId = u64;

/// A funded reward stream. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub donor: Address,
    pub token: TokenId,
    pub total_amount: u128,
    /// Seconds over which `total_amount` is released.
    pub duration: u64,
    /// Raw units released per second: `total_amount / duration`, truncated.
    pub reward_rate: u128,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

impl Donation {
    pub fn new(
        id: DonationId,
        donor: Address,
        token: TokenId,
        total_amount: u128,
        duration: u64,
        start_time: Timestamp,
    ) -> Result<Self, HookError> {
        if total_amount == 0 {
            return Err(HookError::InvalidArgument(
                "donation amount must be non-zero".into(),
            ));
        }
        if duration == 0 {
            return Err(HookError::InvalidArgument(
                "donation duration must be non-zero".into(),
            ));
        }
        let reward_rate = total_amount / u128::from(duration);
        if reward_rate == 0 {
            return Err(HookError::InvalidArgument(format!(
                "{total_amount} spread over {duration}s releases nothing per second"
            )));
        }
        let end_time = start_time
            .checked_add_secs(duration)
            .ok_or(HookError::ArithmeticOverflow)?;
        Ok(Self {
            id,
            donor,
            token,
            total_amount,
            duration,
            reward_rate,
            start_time,
            end_time,
        })
    }

    pub fn is_finished(&self, now: Timestamp) -> bool {
        self.start_time.has_expired(self.duration, now)
    }

    /// The part of `total_amount` the truncated rate never releases.
    pub fn rounding_loss(&self) -> u128 {
        self.total_amount - self.reward_rate * u128::from(self.duration)
    }

    /// Total emission of the stream from its start up to `now`.
    pub fn emitted_by(&self, now: Timestamp) -> u128 {
        let applicable = now.min(self.end_time);
        self.reward_rate * u128::from(self.start_time.elapsed_since(applicable))
    }

    /// Emission still to come after `now`.
    pub fn remaining_emission(&self, now: Timestamp) -> u128 {
        let applicable = now.max(self.start_time).min(self.end_time);
        self.reward_rate * u128::from(applicable.elapsed_since(self.end_time))
    }
}

/// Append-only arena of donations and their stream accumulators.
///
/// `donations[i]` and `streams[i]` always describe the same donation, whose
/// id is `i`.
#[derive(Clone, Debug, Default)]
pub struct DonationRegistry {
    donations: Vec<Donation>,
    streams: Vec<StreamState>,
}

impl DonationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next donation will receive.
    pub fn next_id(&self) -> DonationId {
        self.donations.len() as DonationId
    }

    /// Append a donation built with [`Self::next_id`].
    pub fn push(&mut self, donation: Donation) -> Result<DonationId, HookError> {
        let id = self.next_id();
        if donation.id != id {
            return Err(HookError::InvalidArgument(format!(
                "donation id {} out of sequence, expected {id}",
                donation.id
            )));
        }
        self.streams.push(StreamState::new(donation.start_time));
        self.donations.push(donation);
        Ok(id)
    }

    pub fn get(&self, id: DonationId) -> Option<&Donation> {
        usize::try_from(id).ok().and_then(|i| self.donations.get(i))
    }

    pub fn stream(&self, id: DonationId) -> Option<&StreamState> {
        usize::try_from(id).ok().and_then(|i| self.streams.get(i))
    }

    pub fn streams(&self) -> &[StreamState] {
        &self.streams
    }

    /// Overwrite one stream accumulator.
    pub fn set_stream(&mut self, id: DonationId, stream: StreamState) -> Result<(), HookError> {
        let slot = usize::try_from(id)
            .ok()
            .and_then(|i| self.streams.get_mut(i))
            .ok_or(HookError::DonationNotFound(id))?;
        *slot = stream;
        Ok(())
    }

    /// Overwrite every stream accumulator at once.
    pub fn replace_streams(&mut self, streams: Vec<StreamState>) -> Result<(), HookError> {
        if streams.len() != self.donations.len() {
            return Err(HookError::InvalidArgument(format!(
                "expected {} stream states, got {}",
                self.donations.len(),
                streams.len()
            )));
        }
        self.streams = streams;
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.donations.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.donations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Donation> {
        self.donations.iter()
    }
}

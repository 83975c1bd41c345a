//! Events recorded by the hook, in commit order.

use crate::donation::DonationId;
use rewards_types::{Address, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    /// A new reward stream was funded.
    Donated {
        donation: DonationId,
        donor: Address,
        token: TokenId,
        amount: u128,
        duration: u64,
        reward_rate: u128,
        start_time: Timestamp,
    },
    /// A borrow report changed a user's tracked principal.
    PrincipalUpdated {
        user: Address,
        previous: u128,
        principal: u128,
        total_principal: u128,
        at: Timestamp,
    },
    /// Reward was settled into a position's unclaimed balance.
    RewardCredited {
        user: Address,
        donation: DonationId,
        amount: u128,
        at: Timestamp,
    },
    /// Reward left the hook.
    RewardPaid {
        user: Address,
        donation: DonationId,
        token: TokenId,
        amount: u128,
        at: Timestamp,
    },
}

impl HookEvent {
    /// The user the event concerns, if any.
    pub fn user(&self) -> Option<&Address> {
        match self {
            HookEvent::Donated { .. } => None,
            HookEvent::PrincipalUpdated { user, .. }
            | HookEvent::RewardCredited { user, .. }
            | HookEvent::RewardPaid { user, .. } => Some(user),
        }
    }
}

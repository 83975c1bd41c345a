//! The rewards hook.
//!
//! A donor funds a reward stream that releases linearly over a fixed window.
//! Borrowers share each stream in proportion to their tracked principal. The
//! lending system calls [`RewardsHook::before_borrow`] whenever a borrow is
//! reported and users collect with [`RewardsHook::claim_rewards`].

pub mod accrual;
pub mod donation;
pub mod error;
pub mod event;
pub mod hook;

pub use accrual::{StreamState, UserPosition};
pub use donation::{Donation, DonationId, DonationRegistry};
pub use error::HookError;
pub use event::HookEvent;
pub use hook::{Payout, RewardsHook};

//! Campaign lifecycle state machines.
//!
//! # Design
//!
//! Two orthogonal machines govern a campaign:
//!
//! 1. **Review status** ([`AdsStatus`]) — the moderation lifecycle.
//! 2. **Boost status** ([`BoostStatus`]) — delivery on/off, toggled by the
//!    owner or automatically at daily-budget exhaustion.
//!
//! Every write goes through [`transition_status`] / [`transition_boost`],
//! which validate against the transition table and return a
//! [`TransitionError`] for anything illegal.  Callers never compare status
//! strings ad hoc.
//!
//! # State diagram
//!
//! ```text
//! status:  Pending ──► Approved ──► Completed (terminal)
//!             │            │
//!             ├──► Rejected (terminal)
//!             └──► Expired ◄┘        (duration elapsed; terminal)
//!
//! boost:   Running ◄──► Pause
//!             │           │
//!             └──► Completed ◄┘      (terminal)
//! ```
//!
//! `Rejected` is terminal outright: expiring an already-rejected campaign
//! has no observable effect, so the table forbids it.

use adx_schemas::{AdsCampaign, AdsStatus, BoostStatus};

// ---------------------------------------------------------------------------
// TransitionError
// ---------------------------------------------------------------------------

/// Returned when a lifecycle write is not legal from the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    /// Debug rendering of the state the campaign was in.
    pub from: String,
    /// Debug rendering of the requested target state.
    pub to: String,
}

impl TransitionError {
    fn new(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        Self {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
        }
    }
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "illegal campaign transition: {} -> {}", self.from, self.to)
    }
}

impl std::error::Error for TransitionError {}

// ---------------------------------------------------------------------------
// Transition tables
// ---------------------------------------------------------------------------

/// Whether the review-status machine permits `from -> to`.
pub fn can_transition_status(from: AdsStatus, to: AdsStatus) -> bool {
    use AdsStatus::*;
    matches!(
        (from, to),
        (Pending, Approved)
            | (Pending, Rejected)
            | (Pending, Expired)
            | (Approved, Completed)
            | (Approved, Expired)
    )
}

/// Whether the boost-status machine permits `from -> to`.
pub fn can_transition_boost(from: BoostStatus, to: BoostStatus) -> bool {
    use BoostStatus::*;
    matches!(
        (from, to),
        (Running, Pause) | (Pause, Running) | (Running, Completed) | (Pause, Completed)
    )
}

/// `true` when no further review-status transitions are possible.
pub fn status_is_terminal(status: AdsStatus) -> bool {
    matches!(
        status,
        AdsStatus::Rejected | AdsStatus::Completed | AdsStatus::Expired
    )
}

// ---------------------------------------------------------------------------
// Validated writes
// ---------------------------------------------------------------------------

/// Apply a review-status transition, validating against the table.
/// The campaign is not mutated on error.
pub fn transition_status(campaign: &mut AdsCampaign, to: AdsStatus) -> Result<(), TransitionError> {
    if !can_transition_status(campaign.status, to) {
        return Err(TransitionError::new(campaign.status, to));
    }
    campaign.status = to;
    // Leaving the servable phase stops delivery as well.
    if status_is_terminal(to) && campaign.boost_status != BoostStatus::Completed {
        campaign.boost_status = BoostStatus::Completed;
    }
    Ok(())
}

/// Apply a boost-status transition, validating against the table.
pub fn transition_boost(campaign: &mut AdsCampaign, to: BoostStatus) -> Result<(), TransitionError> {
    if !can_transition_boost(campaign.boost_status, to) {
        return Err(TransitionError::new(campaign.boost_status, to));
    }
    campaign.boost_status = to;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

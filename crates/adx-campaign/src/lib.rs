//! adx-campaign
//!
//! Campaign lifecycle rules, kept pure (no store access, no IO):
//! - [`state_machine`] — explicit transition tables for review status and
//!   boost status, replacing scattered string-equality checks with a
//!   `can_transition` predicate validated on every write.
//! - [`request`] — `createAds`/`updateAds` input validation and promoted-
//!   target resolution through the [`AdsTargetResolver`] collaborator.
//! - [`expiry`] — duration-based expiry computation.

pub mod expiry;
pub mod request;
pub mod state_machine;

pub use expiry::{expires_at, is_expired};
pub use request::{
    apply_update, build_campaign, resolve_target, validate_request, AdsRequest, AdsTargetResolver,
    AdsUpdate, ValidationError,
};
pub use state_machine::{
    can_transition_boost, can_transition_status, status_is_terminal, transition_boost,
    transition_status, TransitionError,
};

//! adx-reward
//!
//! Settles the economic value of one served ad impression among the
//! platform, content creators, content farmers (re-sharers), and the
//! viewer:
//! - [`policy`] — reward-share policy checks and the distinct-author rule.
//! - [`distributor`] — the ledger-backed share distributions, their
//!   idempotency keys, and the composed per-placement settlement.

pub mod distributor;
pub mod policy;

pub use distributor::{
    DistributionReport, RewardDistributor, RewardError, ShareOutcome,
};
pub use policy::{distinct_authors, validate_policy, PolicyError};

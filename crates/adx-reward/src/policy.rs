//! Reward-policy checks and the distinct-author rule.
//!
//! The share policy is caller-supplied configuration.  Whether the four
//! shares sum exactly to `ads_cost` is deliberately **not** enforced: any
//! unallocated remainder simply stays with the platform share.  What is
//! enforced: no share is negative, and the three paid-out shares never
//! exceed the impression cost.

use adx_money::Ust;
use adx_schemas::{AdsSocialReward, PlacementContent};
use std::collections::HashSet;
use uuid::Uuid;

/// Malformed reward policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A share value was negative.
    NegativeShare,
    /// creator + farming + viewer shares exceed the impression cost.
    SharesExceedCost { total: Ust, ads_cost: Ust },
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeShare => write!(f, "reward shares must be >= 0"),
            Self::SharesExceedCost { total, ads_cost } => write!(
                f,
                "paid shares ({total}) exceed the impression cost ({ads_cost})"
            ),
        }
    }
}

impl std::error::Error for PolicyError {}

/// Validate a share policy.
pub fn validate_policy(reward: &AdsSocialReward) -> Result<(), PolicyError> {
    let shares = [
        reward.ads_cost,
        reward.castcle_share,
        reward.farming_share,
        reward.creator_share,
        reward.viewer_share,
    ];
    if shares.iter().any(|s| s.is_negative()) {
        return Err(PolicyError::NegativeShare);
    }
    let total = reward
        .creator_share
        .saturating_add(reward.farming_share)
        .saturating_add(reward.viewer_share);
    if total > reward.ads_cost {
        return Err(PolicyError::SharesExceedCost {
            total,
            ads_cost: reward.ads_cost,
        });
    }
    Ok(())
}

/// Distinct direct authors of a placement, deduplicated by `author_id` in
/// first-seen content order.  An author appearing behind five contents still
/// receives exactly one split share, and the "first author" of the
/// remainder rule is the first one listed.
pub fn distinct_authors(contents: &[PlacementContent]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut authors = Vec::new();
    for content in contents {
        if seen.insert(content.author_id) {
            authors.push(content.author_id);
        }
    }
    authors
}

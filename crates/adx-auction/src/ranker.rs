//! The CPM auction ranking algorithm.
//!
//! # Algorithm
//!
//! 1. Filter candidates to servable campaigns: review status `Approved`,
//!    boost status `Running`, and `daily_spent < daily_budget`.
//! 2. Look up the relevance score `r ∈ [0, 1]` for each campaign's promoted
//!    content; missing scores (unknown content, promoted profiles, degraded
//!    oracle) count as `0`.
//! 3. Compute the bidding CPM:
//!    - `Auto`: `cpm = r × daily_bid_value` — a zero-relevance campaign is
//!      still ranked, at the bottom.
//!    - `CostPerAccount`: the flat configured value, **not** scaled by
//!      relevance, but `r > 0` is required for eligibility.  The asymmetry
//!      is intentional: flat-cost pricing pays the same for any impression,
//!      so serving it to a provably irrelevant viewer buys nothing, while
//!      CPM pricing already discounts irrelevance to a near-zero bid.
//! 4. Sort by CPM descending; ties go to the earlier-created campaign
//!    (prevents starvation of older advertisers), then by id for a total
//!    deterministic order.
//!
//! The full ranked list is returned; the caller decides how many slots to
//! fill.  An empty candidate set yields an empty ranking, not an error.

use adx_money::MoneyError;
use adx_schemas::{AdsCampaign, AdsCpm, AdsStatus, BoostStatus, DailyBidType};
use uuid::Uuid;

use crate::oracle::RelevanceScores;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Ranking failures.  Only malformed inputs produce these; a healthy system
/// never sees them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    /// A relevance score was NaN/infinite, or the CPM product overflowed.
    InvalidBid {
        campaign_id: Uuid,
        source: MoneyError,
    },
}

impl std::fmt::Display for RankError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBid {
                campaign_id,
                source,
            } => write!(f, "invalid bid for campaign {campaign_id}: {source}"),
        }
    }
}

impl std::error::Error for RankError {}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

/// Whether a campaign may appear in an auction at all: approved, boosting,
/// and under its daily budget.
pub fn is_servable(campaign: &AdsCampaign) -> bool {
    campaign.status == AdsStatus::Approved
        && campaign.boost_status == BoostStatus::Running
        && campaign.statistics.daily_spent < campaign.detail.daily_budget
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank servable campaigns for one viewer, highest bidding CPM first.
pub fn rank_ads(
    campaigns: &[AdsCampaign],
    scores: &RelevanceScores,
) -> Result<Vec<AdsCpm>, RankError> {
    // (cpm, created_at, id) triples so the sort is total and deterministic.
    let mut ranked = Vec::new();

    for campaign in campaigns.iter().filter(|c| is_servable(c)) {
        let relevance = campaign
            .ads_ref
            .content_id()
            .and_then(|id| scores.get(&id).copied())
            .unwrap_or(0.0);

        let bidding_cpm = match campaign.detail.daily_bid_type {
            DailyBidType::Auto => campaign
                .detail
                .daily_bid_value
                .mul_score(relevance)
                .map_err(|source| RankError::InvalidBid {
                    campaign_id: campaign.id,
                    source,
                })?,
            DailyBidType::CostPerAccount => {
                if relevance <= 0.0 {
                    continue;
                }
                campaign.detail.daily_bid_value
            }
        };

        ranked.push((bidding_cpm, campaign.created_at, campaign.id));
    }

    ranked.sort_by(|a, b| {
        b.0.cmp(&a.0) // CPM descending
            .then(a.1.cmp(&b.1)) // created_at ascending
            .then(a.2.cmp(&b.2)) // id ascending
    });

    Ok(ranked
        .into_iter()
        .map(|(bidding_cpm, _, campaign_id)| AdsCpm {
            campaign_id,
            bidding_cpm,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use adx_money::Ust;
    use adx_schemas::{
        AdsDetail, AdsObjective, AdsRef, AdsStatistics, DailyBidType,
    };
    use chrono::{Duration, Utc};

    fn campaign(bid: Ust, bid_type: DailyBidType, content: Uuid) -> AdsCampaign {
        AdsCampaign {
            id: Uuid::new_v4(),
            owner: Uuid::new_v4(),
            objective: AdsObjective::Engagement,
            detail: AdsDetail {
                name: "c".into(),
                message: "m".into(),
                daily_budget: Ust::from_whole(100),
                duration_days: 7,
                daily_bid_type: bid_type,
                daily_bid_value: bid,
            },
            ads_ref: AdsRef::Content { id: content },
            status: AdsStatus::Approved,
            boost_status: BoostStatus::Running,
            statistics: AdsStatistics::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn scores(pairs: &[(Uuid, f64)]) -> RelevanceScores {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_candidates_rank_empty() {
        assert_eq!(rank_ads(&[], &RelevanceScores::new()), Ok(vec![]));
    }

    #[test]
    fn higher_cpm_ranks_first() {
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        let a = campaign(Ust::from_whole(10), DailyBidType::Auto, c1);
        let b = campaign(Ust::from_whole(10), DailyBidType::Auto, c2);
        let s = scores(&[(c1, 0.2), (c2, 0.9)]);

        let ranked = rank_ads(&[a.clone(), b.clone()], &s).unwrap();
        assert_eq!(ranked[0].campaign_id, b.id);
        assert_eq!(ranked[0].bidding_cpm, Ust::from_whole(9));
        assert_eq!(ranked[1].campaign_id, a.id);
        assert_eq!(ranked[1].bidding_cpm, Ust::from_whole(2));
    }

    #[test]
    fn cpm_tie_goes_to_earlier_campaign() {
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        let mut older = campaign(Ust::from_whole(10), DailyBidType::Auto, c1);
        let newer = campaign(Ust::from_whole(10), DailyBidType::Auto, c2);
        older.created_at = newer.created_at - Duration::hours(1);
        let s = scores(&[(c1, 0.5), (c2, 0.5)]);

        let ranked = rank_ads(&[newer.clone(), older.clone()], &s).unwrap();
        assert_eq!(ranked[0].campaign_id, older.id);
    }

    #[test]
    fn missing_score_ranks_auto_campaign_last() {
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        let scored = campaign(Ust::from_whole(5), DailyBidType::Auto, c1);
        let unscored = campaign(Ust::from_whole(50), DailyBidType::Auto, c2);
        let s = scores(&[(c1, 0.1)]);

        let ranked = rank_ads(&[unscored.clone(), scored.clone()], &s).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].campaign_id, scored.id);
        assert_eq!(ranked[1].campaign_id, unscored.id);
        assert_eq!(ranked[1].bidding_cpm, Ust::ZERO);
    }

    #[test]
    fn flat_cost_campaign_is_not_relevance_scaled() {
        let c1 = Uuid::new_v4();
        let flat = campaign(Ust::from_whole(8), DailyBidType::CostPerAccount, c1);
        let s = scores(&[(c1, 0.25)]);

        let ranked = rank_ads(&[flat], &s).unwrap();
        assert_eq!(ranked[0].bidding_cpm, Ust::from_whole(8));
    }

    #[test]
    fn flat_cost_campaign_requires_positive_relevance() {
        let c1 = Uuid::new_v4();
        let flat = campaign(Ust::from_whole(8), DailyBidType::CostPerAccount, c1);

        // No score at all.
        assert_eq!(rank_ads(&[flat.clone()], &RelevanceScores::new()), Ok(vec![]));
        // Explicit zero score.
        assert_eq!(rank_ads(&[flat], &scores(&[(c1, 0.0)])), Ok(vec![]));
    }

    #[test]
    fn budget_exhausted_campaign_is_excluded() {
        let c1 = Uuid::new_v4();
        let mut c = campaign(Ust::from_whole(10), DailyBidType::Auto, c1);
        c.statistics.daily_spent = c.detail.daily_budget;
        let s = scores(&[(c1, 0.9)]);

        assert_eq!(rank_ads(&[c], &s), Ok(vec![]));
    }

    #[test]
    fn pending_and_paused_campaigns_are_excluded() {
        let c1 = Uuid::new_v4();
        let mut pending = campaign(Ust::from_whole(10), DailyBidType::Auto, c1);
        pending.status = AdsStatus::Pending;
        let mut paused = campaign(Ust::from_whole(10), DailyBidType::Auto, c1);
        paused.boost_status = BoostStatus::Pause;
        let s = scores(&[(c1, 0.9)]);

        assert_eq!(rank_ads(&[pending, paused], &s), Ok(vec![]));
    }

    #[test]
    fn promoted_profile_has_zero_relevance() {
        let mut c = campaign(Ust::from_whole(10), DailyBidType::Auto, Uuid::new_v4());
        c.ads_ref = AdsRef::User { id: Uuid::new_v4() };

        let ranked = rank_ads(&[c], &RelevanceScores::new()).unwrap();
        assert_eq!(ranked[0].bidding_cpm, Ust::ZERO);
    }

    #[test]
    fn nan_score_is_an_invalid_bid() {
        let c1 = Uuid::new_v4();
        let c = campaign(Ust::from_whole(10), DailyBidType::Auto, c1);
        let err = rank_ads(&[c.clone()], &scores(&[(c1, f64::NAN)]));
        assert_eq!(
            err,
            Err(RankError::InvalidBid {
                campaign_id: c.id,
                source: MoneyError::InvalidMultiplier,
            })
        );
    }

    #[test]
    fn degraded_scores_fall_back_to_bid_order_with_zero_cpm() {
        // All-zero relevance: Auto campaigns all bid zero, order then falls
        // back to created_at — ad serving still returns a ranking.
        let a = campaign(Ust::from_whole(10), DailyBidType::Auto, Uuid::new_v4());
        let mut b = campaign(Ust::from_whole(20), DailyBidType::Auto, Uuid::new_v4());
        b.created_at = a.created_at + Duration::seconds(5);

        let ranked = rank_ads(&[b.clone(), a.clone()], &RelevanceScores::new()).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].campaign_id, a.id);
        assert_eq!(ranked[0].bidding_cpm, Ust::ZERO);
    }
}

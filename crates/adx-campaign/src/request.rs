//! Campaign input validation and promoted-target resolution.
//!
//! `createAds` accepts either a promoted content id or a page handle; the
//! polymorphic reference is resolved **once** here, at the boundary, into
//! the tagged [`AdsRef`] union.  Downstream code matches on the union and
//! never re-interprets raw reference shapes.

use adx_money::Ust;
use adx_schemas::{
    AdsCampaign, AdsDetail, AdsObjective, AdsRef, AdsStatistics, AdsStatus, BoostStatus,
    DailyBidType,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Malformed campaign input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `daily_budget` must be strictly positive.
    NonPositiveBudget { budget: Ust },
    /// `duration_days` must be strictly positive.
    NonPositiveDuration { duration_days: u32 },
    /// `daily_bid_value` must be strictly positive.
    NonPositiveBid { bid: Ust },
    /// Campaign name must be non-empty.
    EmptyName,
    /// Neither the content id nor the page handle resolved to a target.
    InvalidAdsTarget,
    /// Updates and deletes are not permitted on a completed campaign.
    CampaignCompleted { id: Uuid },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveBudget { budget } => {
                write!(f, "daily budget must be > 0, got {budget}")
            }
            Self::NonPositiveDuration { duration_days } => {
                write!(f, "duration must be > 0 days, got {duration_days}")
            }
            Self::NonPositiveBid { bid } => write!(f, "daily bid value must be > 0, got {bid}"),
            Self::EmptyName => write!(f, "campaign name must not be empty"),
            Self::InvalidAdsTarget => {
                write!(f, "ads target resolves to neither a content nor a page")
            }
            Self::CampaignCompleted { id } => {
                write!(f, "campaign {id} is completed and can no longer be modified")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Content-authorship / page lookup, provided by the surrounding system.
pub trait AdsTargetResolver {
    /// Resolve a content id to its canonical id if the content exists.
    fn resolve_content(&self, content_id: Uuid) -> Option<Uuid>;

    /// Resolve a page handle to the owning account id if the page exists.
    fn resolve_page(&self, castcle_id: &str) -> Option<Uuid>;
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// `createAds` request body (validated, not yet resolved).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdsRequest {
    pub name: String,
    pub message: String,
    pub objective: AdsObjective,
    pub daily_budget: Ust,
    pub duration_days: u32,
    pub daily_bid_type: DailyBidType,
    pub daily_bid_value: Ust,
    /// Promoted content, when advertising a cast.
    pub content_id: Option<Uuid>,
    /// Promoted page handle, when advertising a profile.
    pub castcle_id: Option<String>,
}

/// Partial update for `updateAdsById`.  `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdsUpdate {
    pub name: Option<String>,
    pub message: Option<String>,
    pub daily_budget: Option<Ust>,
    pub duration_days: Option<u32>,
    pub daily_bid_value: Option<Ust>,
}

// ---------------------------------------------------------------------------
// Validation & construction
// ---------------------------------------------------------------------------

/// Validate the scalar fields of a create request.
pub fn validate_request(req: &AdsRequest) -> Result<(), ValidationError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if req.daily_budget <= Ust::ZERO {
        return Err(ValidationError::NonPositiveBudget {
            budget: req.daily_budget,
        });
    }
    if req.duration_days == 0 {
        return Err(ValidationError::NonPositiveDuration {
            duration_days: req.duration_days,
        });
    }
    if req.daily_bid_value <= Ust::ZERO {
        return Err(ValidationError::NonPositiveBid {
            bid: req.daily_bid_value,
        });
    }
    Ok(())
}

/// Resolve the promoted target.  Content takes precedence when both are
/// supplied; failing both is [`ValidationError::InvalidAdsTarget`].
pub fn resolve_target(
    req: &AdsRequest,
    resolver: &dyn AdsTargetResolver,
) -> Result<AdsRef, ValidationError> {
    if let Some(content_id) = req.content_id {
        if let Some(id) = resolver.resolve_content(content_id) {
            return Ok(AdsRef::Content { id });
        }
    }
    if let Some(castcle_id) = &req.castcle_id {
        if let Some(id) = resolver.resolve_page(castcle_id) {
            return Ok(AdsRef::User { id });
        }
    }
    Err(ValidationError::InvalidAdsTarget)
}

/// Build a new campaign from a validated request.  Initial review status is
/// `Pending`; boost status starts `Running` and only matters once approved.
pub fn build_campaign(
    owner: Uuid,
    req: &AdsRequest,
    ads_ref: AdsRef,
    now: DateTime<Utc>,
) -> AdsCampaign {
    AdsCampaign {
        id: Uuid::new_v4(),
        owner,
        objective: req.objective,
        detail: AdsDetail {
            name: req.name.clone(),
            message: req.message.clone(),
            daily_budget: req.daily_budget,
            duration_days: req.duration_days,
            daily_bid_type: req.daily_bid_type,
            daily_bid_value: req.daily_bid_value,
        },
        ads_ref,
        status: AdsStatus::Pending,
        boost_status: BoostStatus::Running,
        statistics: AdsStatistics::default(),
        created_at: now,
        updated_at: now,
    }
}

/// Apply a partial update in place.  Refused once the campaign is completed;
/// updated fields are re-validated with the create rules.
pub fn apply_update(
    campaign: &mut AdsCampaign,
    update: &AdsUpdate,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if campaign.status == AdsStatus::Completed {
        return Err(ValidationError::CampaignCompleted { id: campaign.id });
    }
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
    }
    if let Some(budget) = update.daily_budget {
        if budget <= Ust::ZERO {
            return Err(ValidationError::NonPositiveBudget { budget });
        }
    }
    if let Some(duration_days) = update.duration_days {
        if duration_days == 0 {
            return Err(ValidationError::NonPositiveDuration { duration_days });
        }
    }
    if let Some(bid) = update.daily_bid_value {
        if bid <= Ust::ZERO {
            return Err(ValidationError::NonPositiveBid { bid });
        }
    }

    if let Some(name) = &update.name {
        campaign.detail.name = name.clone();
    }
    if let Some(message) = &update.message {
        campaign.detail.message = message.clone();
    }
    if let Some(budget) = update.daily_budget {
        campaign.detail.daily_budget = budget;
    }
    if let Some(duration_days) = update.duration_days {
        campaign.detail.duration_days = duration_days;
    }
    if let Some(bid) = update.daily_bid_value {
        campaign.detail.daily_bid_value = bid;
    }
    campaign.updated_at = now;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    struct FakeResolver {
        contents: HashSet<Uuid>,
        pages: HashMap<String, Uuid>,
    }

    impl AdsTargetResolver for FakeResolver {
        fn resolve_content(&self, content_id: Uuid) -> Option<Uuid> {
            self.contents.get(&content_id).copied()
        }
        fn resolve_page(&self, castcle_id: &str) -> Option<Uuid> {
            self.pages.get(castcle_id).copied()
        }
    }

    fn request() -> AdsRequest {
        AdsRequest {
            name: "launch".into(),
            message: "hello".into(),
            objective: AdsObjective::Engagement,
            daily_budget: Ust::from_whole(5),
            duration_days: 7,
            daily_bid_type: DailyBidType::Auto,
            daily_bid_value: Ust::from_whole(1),
            content_id: None,
            castcle_id: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert_eq!(validate_request(&request()), Ok(()));
    }

    #[test]
    fn zero_budget_rejected() {
        let mut req = request();
        req.daily_budget = Ust::ZERO;
        assert_eq!(
            validate_request(&req),
            Err(ValidationError::NonPositiveBudget { budget: Ust::ZERO })
        );
    }

    #[test]
    fn zero_duration_rejected() {
        let mut req = request();
        req.duration_days = 0;
        assert!(matches!(
            validate_request(&req),
            Err(ValidationError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn blank_name_rejected() {
        let mut req = request();
        req.name = "   ".into();
        assert_eq!(validate_request(&req), Err(ValidationError::EmptyName));
    }

    #[test]
    fn resolves_content_target() {
        let content = Uuid::new_v4();
        let resolver = FakeResolver {
            contents: [content].into_iter().collect(),
            pages: HashMap::new(),
        };
        let mut req = request();
        req.content_id = Some(content);

        assert_eq!(
            resolve_target(&req, &resolver),
            Ok(AdsRef::Content { id: content })
        );
    }

    #[test]
    fn resolves_page_target() {
        let page_owner = Uuid::new_v4();
        let resolver = FakeResolver {
            contents: HashSet::new(),
            pages: [("brand".to_string(), page_owner)].into_iter().collect(),
        };
        let mut req = request();
        req.castcle_id = Some("brand".into());

        assert_eq!(
            resolve_target(&req, &resolver),
            Ok(AdsRef::User { id: page_owner })
        );
    }

    #[test]
    fn unresolvable_target_is_invalid() {
        let resolver = FakeResolver {
            contents: HashSet::new(),
            pages: HashMap::new(),
        };
        let mut req = request();
        req.content_id = Some(Uuid::new_v4());
        req.castcle_id = Some("ghost".into());

        assert_eq!(
            resolve_target(&req, &resolver),
            Err(ValidationError::InvalidAdsTarget)
        );
    }

    #[test]
    fn missing_both_references_is_invalid() {
        let resolver = FakeResolver {
            contents: HashSet::new(),
            pages: HashMap::new(),
        };
        assert_eq!(
            resolve_target(&request(), &resolver),
            Err(ValidationError::InvalidAdsTarget)
        );
    }

    #[test]
    fn built_campaign_starts_pending() {
        let owner = Uuid::new_v4();
        let target = AdsRef::Content { id: Uuid::new_v4() };
        let c = build_campaign(owner, &request(), target, Utc::now());
        assert_eq!(c.status, AdsStatus::Pending);
        assert_eq!(c.boost_status, BoostStatus::Running);
        assert_eq!(c.owner, owner);
        assert_eq!(c.statistics, AdsStatistics::default());
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let mut c = build_campaign(
            Uuid::new_v4(),
            &request(),
            AdsRef::Content { id: Uuid::new_v4() },
            Utc::now(),
        );
        let update = AdsUpdate {
            daily_budget: Some(Ust::from_whole(9)),
            ..Default::default()
        };
        apply_update(&mut c, &update, Utc::now()).unwrap();
        assert_eq!(c.detail.daily_budget, Ust::from_whole(9));
        assert_eq!(c.detail.name, "launch");
    }

    #[test]
    fn update_rejected_on_completed_campaign() {
        let mut c = build_campaign(
            Uuid::new_v4(),
            &request(),
            AdsRef::Content { id: Uuid::new_v4() },
            Utc::now(),
        );
        c.status = AdsStatus::Completed;
        let err = apply_update(&mut c, &AdsUpdate::default(), Utc::now());
        assert_eq!(err, Err(ValidationError::CampaignCompleted { id: c.id }));
    }

    #[test]
    fn update_revalidates_budget() {
        let mut c = build_campaign(
            Uuid::new_v4(),
            &request(),
            AdsRef::Content { id: Uuid::new_v4() },
            Utc::now(),
        );
        let update = AdsUpdate {
            daily_budget: Some(Ust::ZERO),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&mut c, &update, Utc::now()),
            Err(ValidationError::NonPositiveBudget { .. })
        ));
    }
}

//! The ads engine — thin orchestration over the domain crates.

use adx_auction::{fetch_scores_degraded, rank_ads, RelevanceOracle};
use adx_campaign::{
    apply_update, build_campaign, is_expired, resolve_target, transition_boost, transition_status,
    validate_request, AdsRequest, AdsTargetResolver, AdsUpdate,
};
use adx_ledger::{codes, ChartOfAccounts, Ledger, WalletService};
use adx_money::Ust;
use adx_reward::{DistributionReport, RewardDistributor};
use adx_schemas::{
    AccountNature, AdsCampaign, AdsCpm, AdsPlacement, AdsSocialReward, AdsStatus, BoostStatus,
    WalletType,
};
use adx_store::MemoryStore;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::EngineError;

/// Composition root for the auction/reward core.
///
/// Holds one store handle and the collaborator boundaries (personalization
/// oracle, target resolver).  All operations are safe to call from
/// concurrent request handlers; writes serialize through the store's
/// transaction primitive.
pub struct AdsEngine {
    store: MemoryStore,
    chart: ChartOfAccounts,
    ledger: Ledger,
    wallet: WalletService,
    distributor: RewardDistributor,
    oracle: Box<dyn RelevanceOracle + Send + Sync>,
    resolver: Box<dyn AdsTargetResolver + Send + Sync>,
}

impl AdsEngine {
    pub fn new(
        store: MemoryStore,
        platform_account: Uuid,
        oracle: Box<dyn RelevanceOracle + Send + Sync>,
        resolver: Box<dyn AdsTargetResolver + Send + Sync>,
    ) -> Self {
        Self {
            chart: ChartOfAccounts::new(store.clone()),
            ledger: Ledger::new(store.clone()),
            wallet: WalletService::new(store.clone()),
            distributor: RewardDistributor::new(store.clone(), platform_account),
            store,
            oracle,
            resolver,
        }
    }

    /// Create the default chart of accounts the reward pipeline settles
    /// against.  Call once on an empty store.
    pub fn bootstrap_chart(&self) -> Result<(), EngineError> {
        self.chart
            .create_account(codes::TREASURY, "Treasury", AccountNature::Debit, None)?;
        self.chart.create_account(
            codes::ADS_CREDIT,
            "Ads credit",
            AccountNature::Credit,
            None,
        )?;
        self.chart.create_account(
            codes::SOCIAL_REWARD,
            "Social reward",
            AccountNature::Credit,
            None,
        )?;
        self.chart.create_account(
            codes::SOCIAL_REWARD_PERSONAL,
            "Social reward / personal",
            AccountNature::Credit,
            Some(codes::SOCIAL_REWARD),
        )?;
        self.chart.create_account(
            codes::SOCIAL_REWARD_FARMING,
            "Social reward / farming",
            AccountNature::Credit,
            Some(codes::SOCIAL_REWARD),
        )?;
        self.chart.create_account(
            codes::USER_PERSONAL,
            "User personal wallets",
            AccountNature::Credit,
            None,
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Campaign lifecycle
    // -----------------------------------------------------------------------

    /// `createAds`: validate, resolve the promoted target once, persist a
    /// `Pending` campaign.
    pub fn create_ads(&self, owner: Uuid, req: &AdsRequest) -> Result<AdsCampaign, EngineError> {
        validate_request(req)?;
        let ads_ref = resolve_target(req, self.resolver.as_ref())?;
        let campaign = build_campaign(owner, req, ads_ref, Utc::now());
        self.store
            .with_transaction(|session| {
                session.put_campaign(campaign.clone());
                Ok::<_, EngineError>(())
            })?;
        tracing::info!(campaign = %campaign.id, %owner, "campaign created");
        Ok(campaign)
    }

    /// `updateAdsById`: partial update, refused once completed.
    pub fn update_ads_by_id(
        &self,
        id: Uuid,
        update: &AdsUpdate,
    ) -> Result<AdsCampaign, EngineError> {
        self.store.with_transaction(|session| {
            let mut campaign = session
                .campaign(id)
                .cloned()
                .ok_or(EngineError::NotFound { id })?;
            apply_update(&mut campaign, update, Utc::now())?;
            session.put_campaign(campaign.clone());
            Ok(campaign)
        })
    }

    /// `deleteAdsById`: refused once completed.
    pub fn delete_ads_by_id(&self, id: Uuid) -> Result<(), EngineError> {
        self.store.with_transaction(|session| {
            let campaign = session
                .campaign(id)
                .cloned()
                .ok_or(EngineError::NotFound { id })?;
            if campaign.status == AdsStatus::Completed {
                return Err(EngineError::Validation(
                    adx_campaign::ValidationError::CampaignCompleted { id },
                ));
            }
            session.remove_campaign(id);
            Ok(())
        })
    }

    /// `updateAdsBoostStatus`: owner-initiated pause/resume, validated
    /// against the boost transition table.
    pub fn update_ads_boost_status(
        &self,
        id: Uuid,
        to: BoostStatus,
    ) -> Result<AdsCampaign, EngineError> {
        self.transition_campaign(id, |campaign| {
            transition_boost(campaign, to).map_err(EngineError::from)
        })
    }

    /// Review step approves the campaign for delivery.
    pub fn approve_ads(&self, id: Uuid) -> Result<AdsCampaign, EngineError> {
        self.transition_campaign(id, |campaign| {
            transition_status(campaign, AdsStatus::Approved).map_err(EngineError::from)
        })
    }

    /// Review step rejects the campaign (terminal).
    pub fn reject_ads(&self, id: Uuid) -> Result<AdsCampaign, EngineError> {
        self.transition_campaign(id, |campaign| {
            transition_status(campaign, AdsStatus::Rejected).map_err(EngineError::from)
        })
    }

    /// `getListAds`: all campaigns of one owner.
    pub fn get_list_ads(&self, owner: Uuid) -> Vec<AdsCampaign> {
        self.store.campaigns_by_owner(owner)
    }

    /// `lookupAds`: one campaign by id.
    pub fn lookup_ads(&self, id: Uuid) -> Result<AdsCampaign, EngineError> {
        self.store
            .get_campaign(id)
            .ok_or(EngineError::NotFound { id })
    }

    /// Expire every campaign whose duration has elapsed at `now`.
    /// Returns the number of campaigns transitioned.
    pub fn expire_due_campaigns(&self, now: DateTime<Utc>) -> usize {
        let due: Vec<Uuid> = self
            .store
            .all_campaigns()
            .iter()
            .filter(|c| {
                matches!(c.status, AdsStatus::Pending | AdsStatus::Approved) && is_expired(c, now)
            })
            .map(|c| c.id)
            .collect();

        let mut expired = 0;
        for id in due {
            let res = self.transition_campaign(id, |campaign| {
                transition_status(campaign, AdsStatus::Expired).map_err(EngineError::from)
            });
            if res.is_ok() {
                expired += 1;
            }
        }
        if expired > 0 {
            tracing::info!(expired, "campaigns expired");
        }
        expired
    }

    /// Daily scheduler hook: zero every campaign's daily spend.
    pub fn reset_daily_spent(&self) {
        self.store.reset_daily_spent();
    }

    // -----------------------------------------------------------------------
    // Auction
    // -----------------------------------------------------------------------

    /// `getAds`: rank all servable campaigns for one viewer, highest bidding
    /// CPM first.  Oracle failures degrade to zero relevance; non-finite
    /// scores from a misbehaving oracle are dropped before ranking.
    pub fn get_ads(&self, viewer: Uuid) -> Result<Vec<AdsCpm>, EngineError> {
        let campaigns = self.store.all_campaigns();
        let content_ids: Vec<Uuid> = campaigns
            .iter()
            .filter_map(|c| c.ads_ref.content_id())
            .collect();

        let mut scores = fetch_scores_degraded(self.oracle.as_ref(), viewer, &content_ids);
        scores.retain(|_, score| score.is_finite());

        Ok(rank_ads(&campaigns, &scores)?)
    }

    // -----------------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------------

    /// `distributeAdsReward`: settle one placement — creator, farming and
    /// viewer shares in one atomic session, then the campaign spend charge.
    pub fn distribute_ads_reward(
        &self,
        placement: &AdsPlacement,
        reward: &AdsSocialReward,
    ) -> Result<DistributionReport, EngineError> {
        Ok(self.distributor.distribute_ads_reward(placement, reward)?)
    }

    // -----------------------------------------------------------------------
    // Balance queries
    // -----------------------------------------------------------------------

    /// Balance of one owner wallet.
    pub fn wallet_balance(&self, owner: Uuid, wallet_type: WalletType) -> Ust {
        self.wallet.balance(owner, wallet_type)
    }

    /// Balance of one chart account (leaf, nature-signed).
    pub fn pool_balance(&self, code: &str) -> Result<Ust, EngineError> {
        Ok(self.ledger.get_balance(code)?)
    }

    /// Direct access to the underlying ledger for funding/seeding flows.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn transition_campaign(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut AdsCampaign) -> Result<(), EngineError>,
    ) -> Result<AdsCampaign, EngineError> {
        self.store.with_transaction(|session| {
            let mut campaign = session
                .campaign(id)
                .cloned()
                .ok_or(EngineError::NotFound { id })?;
            f(&mut campaign)?;
            campaign.updated_at = Utc::now();
            session.put_campaign(campaign.clone());
            Ok(campaign)
        })
    }
}

// ---------------------------------------------------------------------------
// Unit tests (engine-level; cross-crate scenarios live in adx-testkit)
// ---------------------------------------------------------------------------

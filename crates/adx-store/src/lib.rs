//! adx-store
//!
//! Deterministic in-memory transactional document store.
//!
//! The auction/reward core treats its durable store as an opaque
//! collaborator with a session/transaction primitive.  This crate is the
//! in-process stand-in: three logical collections (`accounts`,
//! `transactions`, `campaigns`) plus the reward-application dedup set, all
//! behind a single `RwLock`.
//!
//! # Transaction model
//!
//! [`MemoryStore::with_transaction`] runs the caller's closure against a
//! working copy of the store state while holding the write lock.  On `Ok`
//! the working copy replaces the live state; on `Err` it is discarded.
//! Consequences:
//!
//! - Commit-or-discard: either every staged write of one session becomes
//!   visible or none does.
//! - Readers (behind the read lock) can never observe a half-applied
//!   session.
//! - Read-your-writes: reads inside the session go through the working copy
//!   and therefore see earlier staged writes of the same session.
//! - Writers are serialized.  That is the price of the single-lock model
//!   and is acceptable for an in-process store; a document database would
//!   provide the same guarantees through its own session machinery.
//!
//! # Spend charging
//!
//! [`MemoryStore::charge_campaign_spend`] is the one read-modify-write that
//! must be conditional: two concurrent impressions must not both observe
//! "under budget" and jointly overspend.  It runs entirely under the write
//! lock — check admission, increment, auto-pause — as a single atomic step.

mod session;

pub use session::StoreSession;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use adx_money::Ust;
use adx_schemas::{Account, AdsCampaign, AdsStatus, BoostStatus, RewardKind, Transaction};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures surfaced by store-level operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No campaign with the given id exists.
    CampaignNotFound { id: Uuid },
    /// The campaign is not in a servable state (not Approved, or boost not
    /// Running), so a spend charge was refused.
    CampaignNotServing { id: Uuid },
    /// Daily budget already exhausted at charge time; the charge was refused.
    BudgetExhausted { id: Uuid },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CampaignNotFound { id } => write!(f, "campaign {id} not found"),
            Self::CampaignNotServing { id } => {
                write!(f, "campaign {id} is not approved/running; charge refused")
            }
            Self::BudgetExhausted { id } => {
                write!(f, "campaign {id} daily budget exhausted; charge refused")
            }
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// The three logical collections plus the reward dedup set.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    pub(crate) accounts: BTreeMap<String, Account>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) campaigns: BTreeMap<Uuid, AdsCampaign>,
    pub(crate) applied_rewards: BTreeSet<(Uuid, RewardKind)>,
}

/// Outcome of an admitted spend charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeOutcome {
    /// Daily spend after the charge (may overshoot the daily budget; the
    /// final admitted charge of the day is allowed to cross the line).
    pub daily_spent: Ust,
    /// `true` when this charge crossed the daily budget and the campaign's
    /// boost status was flipped to `Pause`.
    pub auto_paused: bool,
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Shared handle to the in-memory store.  Cloning is cheap (Arc).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` inside one atomic store transaction.
    ///
    /// The closure receives a [`StoreSession`] over a working copy of the
    /// state.  `Ok` commits every staged write in one step; `Err` discards
    /// them all.  Writers are serialized for the duration of the closure.
    pub fn with_transaction<T, E>(
        &self,
        f: impl FnOnce(&mut StoreSession<'_>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self.inner.write().expect("store lock poisoned");
        let mut working = guard.clone();
        let mut session = StoreSession::new(&mut working);
        let out = f(&mut session)?;
        *guard = working;
        Ok(out)
    }

    /// Run a read-only closure against a consistent view of the store.
    pub fn with_read<T>(&self, f: impl FnOnce(&StoreView<'_>) -> T) -> T {
        let guard = self.inner.read().expect("store lock poisoned");
        f(&StoreView { state: &guard })
    }

    // -----------------------------------------------------------------------
    // Convenience read surface
    // -----------------------------------------------------------------------

    /// Fetch one account by code.
    pub fn get_account(&self, code: &str) -> Option<Account> {
        self.with_read(|v| v.account(code).cloned())
    }

    /// Fetch one campaign by id.
    pub fn get_campaign(&self, id: Uuid) -> Option<AdsCampaign> {
        self.with_read(|v| v.campaign(id).cloned())
    }

    /// All campaigns owned by `owner`, in id order.
    pub fn campaigns_by_owner(&self, owner: Uuid) -> Vec<AdsCampaign> {
        self.with_read(|v| {
            v.campaigns()
                .filter(|c| c.owner == owner)
                .cloned()
                .collect()
        })
    }

    /// All campaigns, in id order.
    pub fn all_campaigns(&self) -> Vec<AdsCampaign> {
        self.with_read(|v| v.campaigns().cloned().collect())
    }

    /// Whether the `(placement, kind)` reward was already distributed.
    pub fn is_reward_applied(&self, placement_id: Uuid, kind: RewardKind) -> bool {
        self.with_read(|v| v.reward_applied(placement_id, kind))
    }

    /// Number of committed ledger transactions.
    pub fn transaction_count(&self) -> usize {
        self.with_read(|v| v.transactions().len())
    }

    // -----------------------------------------------------------------------
    // Atomic spend charging
    // -----------------------------------------------------------------------

    /// Atomically charge `cost` against a campaign's daily budget.
    ///
    /// Admission rule: the charge is admitted iff `daily_spent <
    /// daily_budget` **at charge time**.  The admitted charge may overshoot
    /// the budget (e.g. spent 4.99 of 5.00, cost 0.02 → 5.01); crossing the
    /// line flips `boost_status` to `Pause` so the campaign drops out of the
    /// next auction round.
    ///
    /// Statistics are updated in the same step: `budget_spent`, paid
    /// impression count, and the realized CPM.
    pub fn charge_campaign_spend(
        &self,
        id: Uuid,
        cost: Ust,
    ) -> Result<ChargeOutcome, StoreError> {
        let mut guard = self.inner.write().expect("store lock poisoned");
        let campaign = guard
            .campaigns
            .get_mut(&id)
            .ok_or(StoreError::CampaignNotFound { id })?;

        if campaign.status != AdsStatus::Approved || campaign.boost_status != BoostStatus::Running
        {
            return Err(StoreError::CampaignNotServing { id });
        }
        if campaign.statistics.daily_spent >= campaign.detail.daily_budget {
            return Err(StoreError::BudgetExhausted { id });
        }

        let stats = &mut campaign.statistics;
        stats.daily_spent = stats.daily_spent.saturating_add(cost);
        stats.budget_spent = stats.budget_spent.saturating_add(cost);
        stats.impression.paid += 1;
        stats.cpm = realized_cpm(stats.budget_spent, stats.impression.paid);

        let auto_paused = stats.daily_spent >= campaign.detail.daily_budget;
        if auto_paused {
            campaign.boost_status = BoostStatus::Pause;
        }

        Ok(ChargeOutcome {
            daily_spent: campaign.statistics.daily_spent,
            auto_paused,
        })
    }

    /// Reset every campaign's `daily_spent` to zero (daily scheduler hook).
    ///
    /// Boost status is left untouched: resuming an auto-paused campaign is
    /// an explicit owner/system transition, not a side effect of the reset.
    pub fn reset_daily_spent(&self) {
        let mut guard = self.inner.write().expect("store lock poisoned");
        for campaign in guard.campaigns.values_mut() {
            campaign.statistics.daily_spent = Ust::ZERO;
        }
    }
}

/// Realized CPM: `budget_spent × 1000 / paid impressions`.
fn realized_cpm(budget_spent: Ust, paid_impressions: u64) -> Ust {
    if paid_impressions == 0 {
        return Ust::ZERO;
    }
    let total = (budget_spent.micros() as i128) * 1000 / (paid_impressions as i128);
    Ust::from_micros(total.min(i64::MAX as i128) as i64)
}

// ---------------------------------------------------------------------------
// Read view
// ---------------------------------------------------------------------------

/// Borrowed read-only view over a consistent store snapshot.
pub struct StoreView<'a> {
    state: &'a StoreState,
}

impl<'a> StoreView<'a> {
    pub fn account(&self, code: &str) -> Option<&'a Account> {
        self.state.accounts.get(code)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &'a Account> {
        self.state.accounts.values()
    }

    pub fn campaign(&self, id: Uuid) -> Option<&'a AdsCampaign> {
        self.state.campaigns.get(&id)
    }

    pub fn campaigns(&self) -> impl Iterator<Item = &'a AdsCampaign> {
        self.state.campaigns.values()
    }

    pub fn transactions(&self) -> &'a [Transaction] {
        &self.state.transactions
    }

    pub fn reward_applied(&self, placement_id: Uuid, kind: RewardKind) -> bool {
        self.state.applied_rewards.contains(&(placement_id, kind))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use adx_schemas::{
        AdsDetail, AdsObjective, AdsRef, AdsStatistics, DailyBidType,
    };
    use chrono::Utc;

    fn campaign(daily_budget: Ust, daily_spent: Ust) -> AdsCampaign {
        AdsCampaign {
            id: Uuid::new_v4(),
            owner: Uuid::new_v4(),
            objective: AdsObjective::Engagement,
            detail: AdsDetail {
                name: "c".into(),
                message: "m".into(),
                daily_budget,
                duration_days: 7,
                daily_bid_type: DailyBidType::Auto,
                daily_bid_value: Ust::from_whole(1),
            },
            ads_ref: AdsRef::Content { id: Uuid::new_v4() },
            status: AdsStatus::Approved,
            boost_status: BoostStatus::Running,
            statistics: AdsStatistics {
                daily_spent,
                ..Default::default()
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn store_with(c: &AdsCampaign) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .with_transaction(|s| {
                s.put_campaign(c.clone());
                Ok::<_, StoreError>(())
            })
            .unwrap();
        store
    }

    #[test]
    fn commit_makes_writes_visible() {
        let c = campaign(Ust::from_whole(5), Ust::ZERO);
        let store = store_with(&c);
        assert_eq!(store.get_campaign(c.id), Some(c));
    }

    #[test]
    fn abort_discards_all_writes() {
        let c = campaign(Ust::from_whole(5), Ust::ZERO);
        let store = MemoryStore::new();
        let res: Result<(), StoreError> = store.with_transaction(|s| {
            s.put_campaign(c.clone());
            Err(StoreError::CampaignNotFound { id: c.id })
        });
        assert!(res.is_err());
        assert_eq!(store.get_campaign(c.id), None);
    }

    #[test]
    fn session_reads_its_own_writes() {
        let c = campaign(Ust::from_whole(5), Ust::ZERO);
        let store = MemoryStore::new();
        store
            .with_transaction(|s| {
                s.put_campaign(c.clone());
                assert!(s.campaign(c.id).is_some());
                Ok::<_, StoreError>(())
            })
            .unwrap();
    }

    #[test]
    fn charge_under_budget_is_admitted() {
        let c = campaign(Ust::from_whole(5), Ust::ZERO);
        let store = store_with(&c);

        let out = store
            .charge_campaign_spend(c.id, Ust::from_micros(20_000))
            .unwrap();
        assert_eq!(out.daily_spent, Ust::from_micros(20_000));
        assert!(!out.auto_paused);
    }

    #[test]
    fn final_charge_may_overshoot_then_auto_pauses() {
        // GIVEN dailyBudget=5, dailySpent=4.99, incoming cost=0.02
        let c = campaign(Ust::from_whole(5), Ust::from_micros(4_990_000));
        let store = store_with(&c);

        let out = store
            .charge_campaign_spend(c.id, Ust::from_micros(20_000))
            .unwrap();

        // THEN dailySpent=5.01 and the campaign is auto-paused.
        assert_eq!(out.daily_spent, Ust::from_micros(5_010_000));
        assert!(out.auto_paused);
        let after = store.get_campaign(c.id).unwrap();
        assert_eq!(after.boost_status, BoostStatus::Pause);
    }

    #[test]
    fn charge_at_budget_is_refused() {
        let c = campaign(Ust::from_whole(5), Ust::from_whole(5));
        let store = store_with(&c);

        let err = store.charge_campaign_spend(c.id, Ust::from_micros(1));
        assert_eq!(err, Err(StoreError::BudgetExhausted { id: c.id }));
    }

    #[test]
    fn charge_refused_for_paused_campaign() {
        let mut c = campaign(Ust::from_whole(5), Ust::ZERO);
        c.boost_status = BoostStatus::Pause;
        let store = store_with(&c);

        let err = store.charge_campaign_spend(c.id, Ust::from_micros(1));
        assert_eq!(err, Err(StoreError::CampaignNotServing { id: c.id }));
    }

    #[test]
    fn charge_refused_for_unknown_campaign() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let err = store.charge_campaign_spend(id, Ust::from_micros(1));
        assert_eq!(err, Err(StoreError::CampaignNotFound { id }));
    }

    #[test]
    fn charge_updates_statistics_and_cpm() {
        let c = campaign(Ust::from_whole(100), Ust::ZERO);
        let store = store_with(&c);

        store
            .charge_campaign_spend(c.id, Ust::from_whole(2))
            .unwrap();
        store
            .charge_campaign_spend(c.id, Ust::from_whole(4))
            .unwrap();

        let after = store.get_campaign(c.id).unwrap();
        assert_eq!(after.statistics.budget_spent, Ust::from_whole(6));
        assert_eq!(after.statistics.impression.paid, 2);
        // realized CPM = 6 * 1000 / 2 = 3000 UST per mille
        assert_eq!(after.statistics.cpm, Ust::from_whole(3000));
    }

    #[test]
    fn reset_daily_spent_zeroes_all_campaigns() {
        let c = campaign(Ust::from_whole(5), Ust::from_whole(3));
        let store = store_with(&c);

        store.reset_daily_spent();
        let after = store.get_campaign(c.id).unwrap();
        assert_eq!(after.statistics.daily_spent, Ust::ZERO);
    }

    #[test]
    fn reset_daily_spent_does_not_resume_paused_boost() {
        let mut c = campaign(Ust::from_whole(5), Ust::from_whole(5));
        c.boost_status = BoostStatus::Pause;
        let store = store_with(&c);

        store.reset_daily_spent();
        let after = store.get_campaign(c.id).unwrap();
        assert_eq!(after.boost_status, BoostStatus::Pause);
    }

    #[test]
    fn reward_dedup_set_round_trip() {
        let store = MemoryStore::new();
        let placement = Uuid::new_v4();
        assert!(!store.is_reward_applied(placement, RewardKind::Creator));

        store
            .with_transaction(|s| {
                s.mark_reward_applied(placement, RewardKind::Creator);
                Ok::<_, StoreError>(())
            })
            .unwrap();

        assert!(store.is_reward_applied(placement, RewardKind::Creator));
        assert!(!store.is_reward_applied(placement, RewardKind::Viewer));
    }
}

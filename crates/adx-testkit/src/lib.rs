//! adx-testkit
//!
//! Shared fixtures for cross-crate scenario tests: a funded engine with
//! scripted collaborators, campaign/placement factories, and ledger
//! assertion helpers.  Nothing in here ships to production builds; the
//! crate exists so the `tests/scenario_*.rs` suites stay focused on the
//! behaviour under test instead of setup boilerplate.

use std::collections::HashMap;

use adx_auction::{OracleError, RelevanceOracle, RelevanceScores};
use adx_campaign::AdsTargetResolver;
use adx_ledger::codes;
use adx_money::Ust;
use adx_schemas::{
    AdsCampaign, AdsDetail, AdsObjective, AdsPaymentMethod, AdsPlacement, AdsRef, AdsSocialReward,
    AdsStatistics, AdsStatus, BoostStatus, DailyBidType, EntryLine, LedgerEntry, PlacementContent,
    Transaction, TransactionLeg, WalletType,
};
use adx_service::AdsEngine;
use adx_store::{MemoryStore, StoreError};

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// Route `tracing` output to the test harness.  Safe to call from every
/// test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .init();
    });
}

// ---------------------------------------------------------------------------
// Scripted collaborators
// ---------------------------------------------------------------------------

/// Oracle that answers from a fixed score table, or fails every call when
/// built with [`ScriptedOracle::down`].
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    scores: HashMap<Uuid, f64>,
    down: bool,
}

impl ScriptedOracle {
    pub fn with_scores(scores: impl IntoIterator<Item = (Uuid, f64)>) -> Self {
        Self {
            scores: scores.into_iter().collect(),
            down: false,
        }
    }

    /// An oracle whose every call fails, for degradation scenarios.
    pub fn down() -> Self {
        Self {
            scores: HashMap::new(),
            down: true,
        }
    }
}

impl RelevanceOracle for ScriptedOracle {
    fn personalize_contents(
        &self,
        _viewer: Uuid,
        content_ids: &[Uuid],
    ) -> Result<RelevanceScores, OracleError> {
        if self.down {
            return Err(OracleError::Unavailable {
                reason: "scripted outage".into(),
            });
        }
        Ok(content_ids
            .iter()
            .filter_map(|id| self.scores.get(id).map(|s| (*id, *s)))
            .collect())
    }
}

/// Resolver that accepts every content id and knows no pages.
#[derive(Debug, Default)]
pub struct OpenResolver;

impl AdsTargetResolver for OpenResolver {
    fn resolve_content(&self, content_id: Uuid) -> Option<Uuid> {
        Some(content_id)
    }
    fn resolve_page(&self, _castcle_id: &str) -> Option<Uuid> {
        None
    }
}

// ---------------------------------------------------------------------------
// Engine fixture
// ---------------------------------------------------------------------------

/// A bootstrapped engine plus the handles scenarios poke at directly.
pub struct EngineFixture {
    pub engine: AdsEngine,
    pub store: MemoryStore,
    pub platform: Uuid,
}

/// Build an engine over a fresh store: default chart of accounts created,
/// reward pools funded from treasury with the given amounts.
pub fn funded_engine(
    oracle: ScriptedOracle,
    personal_pool: Ust,
    farming_pool: Ust,
) -> EngineFixture {
    init_test_tracing();
    let store = MemoryStore::new();
    let platform = Uuid::new_v4();
    let engine = AdsEngine::new(
        store.clone(),
        platform,
        Box::new(oracle),
        Box::new(OpenResolver),
    );
    engine.bootstrap_chart().expect("fresh store");

    for (pool, amount) in [
        (codes::SOCIAL_REWARD_PERSONAL, personal_pool),
        (codes::SOCIAL_REWARD_FARMING, farming_pool),
    ] {
        if amount > Ust::ZERO {
            engine
                .ledger()
                .record_transaction(
                    None,
                    vec![TransactionLeg::new(
                        platform,
                        WalletType::CastcleSocial,
                        amount,
                    )],
                    vec![LedgerEntry {
                        debit: EntryLine::new(codes::TREASURY, amount),
                        credit: EntryLine::new(pool, amount),
                    }],
                )
                .expect("pool funding");
        }
    }

    EngineFixture {
        engine,
        store,
        platform,
    }
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// Deterministic timestamp for ordering-sensitive scenarios.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).single().unwrap()
}

/// An approved, running campaign inserted straight into the store, with
/// every ordering-relevant field under the caller's control.
pub struct CampaignSpec {
    pub content_id: Uuid,
    pub daily_bid_type: DailyBidType,
    pub daily_bid_value: Ust,
    pub daily_budget: Ust,
    pub daily_spent: Ust,
    pub created_at: DateTime<Utc>,
}

impl Default for CampaignSpec {
    fn default() -> Self {
        Self {
            content_id: Uuid::new_v4(),
            daily_bid_type: DailyBidType::Auto,
            daily_bid_value: Ust::from_whole(1),
            daily_budget: Ust::from_whole(100),
            daily_spent: Ust::ZERO,
            created_at: at(0),
        }
    }
}

/// Insert an `Approved`/`Running` campaign built from `spec`.
pub fn insert_approved_campaign(store: &MemoryStore, spec: CampaignSpec) -> AdsCampaign {
    let campaign = AdsCampaign {
        id: Uuid::new_v4(),
        owner: Uuid::new_v4(),
        objective: AdsObjective::Engagement,
        detail: AdsDetail {
            name: "fixture".into(),
            message: "fixture".into(),
            daily_budget: spec.daily_budget,
            duration_days: 30,
            daily_bid_type: spec.daily_bid_type,
            daily_bid_value: spec.daily_bid_value,
        },
        ads_ref: AdsRef::Content {
            id: spec.content_id,
        },
        status: AdsStatus::Approved,
        boost_status: BoostStatus::Running,
        statistics: AdsStatistics {
            daily_spent: spec.daily_spent,
            ..Default::default()
        },
        created_at: spec.created_at,
        updated_at: spec.created_at,
    };
    store
        .with_transaction(|s| {
            s.put_campaign(campaign.clone());
            Ok::<_, StoreError>(())
        })
        .expect("insert campaign");
    campaign
}

/// A placement of `campaign` whose feed listed one content per author.
pub fn placement_for(campaign_id: Uuid, authors: &[Uuid], cost: Ust) -> AdsPlacement {
    AdsPlacement {
        id: Uuid::new_v4(),
        viewer: Uuid::new_v4(),
        campaign_id,
        payment_method: AdsPaymentMethod::AdsCredit,
        contents: authors
            .iter()
            .map(|author| PlacementContent {
                author_id: *author,
                content_id: Uuid::new_v4(),
            })
            .collect(),
        cost,
        created_at: at(0),
    }
}

/// Reward policy with the platform share left implicit.
pub fn reward_policy(ads_cost: Ust, creator: Ust, farming: Ust, viewer: Ust) -> AdsSocialReward {
    AdsSocialReward {
        ads_cost,
        castcle_share: Ust::ZERO,
        farming_share: farming,
        creator_share: creator,
        viewer_share: viewer,
    }
}

// ---------------------------------------------------------------------------
// Ledger assertions
// ---------------------------------------------------------------------------

/// Σ debits − Σ credits over one transaction's entry pairs; zero iff
/// balanced.
pub fn entry_imbalance(tx: &Transaction) -> i128 {
    let debits: i128 = tx.entries.iter().map(|e| e.debit.value.micros() as i128).sum();
    let credits: i128 = tx
        .entries
        .iter()
        .map(|e| e.credit.value.micros() as i128)
        .sum();
    debits - credits
}

/// Panic unless every committed transaction is individually balanced.
pub fn assert_ledger_balanced(store: &MemoryStore) {
    store.with_read(|view| {
        for tx in view.transactions() {
            assert_eq!(
                entry_imbalance(tx),
                0,
                "transaction {} is not balanced",
                tx.id
            );
        }
    });
}

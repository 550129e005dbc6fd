//! adx-schemas
//!
//! Shared domain types for the ads auction / social-reward core:
//! - chart-of-accounts and ledger records (`Account`, `Transaction`)
//! - campaign records (`AdsCampaign` and its parts)
//! - placement / reward-policy value objects
//!
//! Pure data: serde derives, ids, timestamps — no behaviour beyond trivial
//! constructors and accessors.  All money fields are fixed-point [`Ust`].

use adx_money::Ust;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Wallets & accounts
// ---------------------------------------------------------------------------

/// Namespace partitioning an owner's balance by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletType {
    /// Personal earnings wallet (withdrawable).
    Personal,
    /// Ad-spend credit wallet of an advertiser.
    Ads,
    /// Platform treasury.
    CastcleTreasury,
    /// Social-reward funding wallet of the platform.
    CastcleSocial,
    /// External on-ramp deposits.
    ExternalDeposit,
}

/// Whether increases to an account are recorded as debits or credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountNature {
    Debit,
    Credit,
}

/// A node in the chart of accounts.
///
/// `code` is unique and hierarchical (e.g. `SOCIAL_REWARD.PERSONAL`).
/// Root accounts have no `parent_code`.  The tree is acyclic by
/// construction: a parent must already exist when a child is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub code: String,
    pub name: String,
    pub nature: AccountNature,
    pub parent_code: Option<String>,
    /// Child codes in creation order.
    pub child_codes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Ledger records
// ---------------------------------------------------------------------------

/// One owner-facing leg of a transaction: money entering (`to`) or leaving
/// (`from`) the `(owner, wallet_type)` balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLeg {
    pub owner: Uuid,
    pub wallet_type: WalletType,
    pub value: Ust,
}

impl TransactionLeg {
    pub fn new(owner: Uuid, wallet_type: WalletType, value: Ust) -> Self {
        Self {
            owner,
            wallet_type,
            value,
        }
    }
}

/// One side of a double-entry pair: an amount against a chart account code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLine {
    pub account_code: String,
    pub value: Ust,
}

impl EntryLine {
    pub fn new(account_code: impl Into<String>, value: Ust) -> Self {
        Self {
            account_code: account_code.into(),
            value,
        }
    }
}

/// An explicit debit/credit pair.  The transaction-level invariant is
/// Σ debit.value == Σ credit.value across all entries of one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub debit: EntryLine,
    pub credit: EntryLine,
}

/// An immutable ledger transaction.
///
/// `from` is optional — absent for pure internal reclassification (e.g. a
/// pool top-up recorded only through entries).  Corrections are made by new
/// offsetting transactions, never by mutating a persisted one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub from: Option<TransactionLeg>,
    pub to: Vec<TransactionLeg>,
    pub entries: Vec<LedgerEntry>,
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

/// Campaign objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdsObjective {
    Engagement,
    Reach,
}

/// Bid pricing model for a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DailyBidType {
    /// Relevance-weighted CPM bidding; `daily_bid_value` is the maximum bid.
    Auto,
    /// Flat cost per reached account; relevance does not scale the price but
    /// a zero-relevance viewer is never charged for.
    CostPerAccount,
}

/// Campaign review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdsStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Expired,
}

/// Boost (delivery) status, orthogonal to review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoostStatus {
    Running,
    Pause,
    Completed,
}

/// The promoted target, resolved once at the boundary into a tagged union.
/// Downstream code matches on this; there is no ad-hoc `$ref`/`$id` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AdsRef {
    /// A promoted piece of content.
    Content { id: Uuid },
    /// A promoted user or page profile.
    User { id: Uuid },
}

impl AdsRef {
    /// The referenced id regardless of kind.
    pub fn id(&self) -> Uuid {
        match self {
            AdsRef::Content { id } | AdsRef::User { id } => *id,
        }
    }

    /// The content id scored by the personalization oracle, if any.
    /// Promoted profiles have no content to score.
    pub fn content_id(&self) -> Option<Uuid> {
        match self {
            AdsRef::Content { id } => Some(*id),
            AdsRef::User { .. } => None,
        }
    }
}

/// Owner-supplied campaign configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdsDetail {
    pub name: String,
    pub message: String,
    pub daily_budget: Ust,
    /// Campaign duration in days, counted from `created_at`.
    pub duration_days: u32,
    pub daily_bid_type: DailyBidType,
    pub daily_bid_value: Ust,
}

/// Paid/organic counter pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidOrganic {
    pub organic: u64,
    pub paid: u64,
}

/// Spend and delivery statistics, updated as impressions are settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdsStatistics {
    pub budget_spent: Ust,
    pub daily_spent: Ust,
    pub impression: PaidOrganic,
    pub reach: PaidOrganic,
    /// Realized cost per mille over paid impressions.
    pub cpm: Ust,
}

/// An advertising campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdsCampaign {
    pub id: Uuid,
    /// Owning user or page account.
    pub owner: Uuid,
    pub objective: AdsObjective,
    pub detail: AdsDetail,
    pub ads_ref: AdsRef,
    pub status: AdsStatus,
    pub boost_status: BoostStatus,
    pub statistics: AdsStatistics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Placements & rewards
// ---------------------------------------------------------------------------

/// How an impression is paid for by the advertiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdsPaymentMethod {
    /// Drawn from the advertiser's ads-credit wallet.
    AdsCredit,
    /// Drawn from the advertiser's token balance.
    Token,
}

/// One content entry shown in a placement.  For recast/farmed content every
/// intermediate re-sharer appears as its own entry, so the same `author_id`
/// may occur more than once across a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementContent {
    pub author_id: Uuid,
    pub content_id: Uuid,
}

/// One served ad impression — the unit the reward distributor settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdsPlacement {
    pub id: Uuid,
    /// The viewing account.
    pub viewer: Uuid,
    pub campaign_id: Uuid,
    pub payment_method: AdsPaymentMethod,
    /// All content authors touched by this impression.
    pub contents: Vec<PlacementContent>,
    /// Cost of this impression in UST.
    pub cost: Ust,
    pub created_at: DateTime<Utc>,
}

/// Reward-share policy for one impression.  Supplied by configuration, not
/// persisted per placement.  The three paid shares need not sum to
/// `ads_cost`; any unallocated remainder stays with the platform share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdsSocialReward {
    pub ads_cost: Ust,
    pub castcle_share: Ust,
    pub farming_share: Ust,
    pub creator_share: Ust,
    pub viewer_share: Ust,
}

/// Which share of a placement a distribution call settles.  Used as half of
/// the idempotency key `(placement_id, RewardKind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RewardKind {
    Creator,
    Farming,
    Viewer,
}

/// One ranked auction result: a campaign and the CPM it bids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdsCpm {
    pub campaign_id: Uuid,
    pub bidding_cpm: Ust,
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

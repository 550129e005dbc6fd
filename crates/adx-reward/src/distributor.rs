//! Ledger-backed reward distribution.
//!
//! # Decomposition
//!
//! Three sub-operations settle one placement, each independently callable
//! and each one **balanced** ledger transaction:
//!
//! - creator share: `SOCIAL_REWARD.PERSONAL` → each distinct author's
//!   `PERSONAL` wallet, split evenly (remainder to the first author);
//! - farming share: same author set, sourced from `SOCIAL_REWARD.FARMING` —
//!   a distinct account code, never conflated with the creator pool;
//! - viewer share: `SOCIAL_REWARD.PERSONAL` → the viewer's `PERSONAL`
//!   wallet, whole.
//!
//! The platform share is retained implicitly: it is simply never debited
//! out of the pool.
//!
//! # Idempotency & partial failure
//!
//! Every sub-operation stages its `(placement_id, RewardKind)` dedup key in
//! the same session as its ledger writes.  A crash between sub-operations
//! leaves the committed ones standing (each is individually balanced) and a
//! retry skips them via the key — re-running a paid share is a no-op
//! reported as [`ShareOutcome::AlreadyApplied`].
//!
//! When the three shares are composed through
//! [`RewardDistributor::distribute_ads_reward`] they run in **one** session:
//! any failure aborts the whole invocation and no partial ledger state from
//! it becomes visible.  The "siblings are not rolled back" rule applies
//! across independently-invoked distributions, not within one composed call.

use adx_ledger::{codes, Ledger, LedgerError};
use adx_money::{MoneyError, Ust};
use adx_schemas::{
    AdsPlacement, AdsSocialReward, EntryLine, LedgerEntry, RewardKind, TransactionLeg, WalletType,
};
use adx_store::{ChargeOutcome, MemoryStore, StoreError, StoreSession};
use uuid::Uuid;

use crate::policy::{distinct_authors, validate_policy, PolicyError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures during reward distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardError {
    /// The funding pool cannot cover the share.  Expected and recoverable:
    /// the share is skipped, siblings already paid stand.
    InsufficientPoolBalance {
        pool: String,
        needed: Ust,
        available: Ust,
    },
    /// Creator/farming share requested but the placement lists no contents.
    NoAuthors { placement_id: Uuid },
    /// Malformed share policy.
    Policy(PolicyError),
    /// Ledger invariant violation — indicates a bug, not a user error.
    Ledger(LedgerError),
    /// Share arithmetic failure.
    Money(MoneyError),
    /// Campaign spend charge refused (unknown / not serving / exhausted).
    Charge(StoreError),
}

impl std::fmt::Display for RewardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientPoolBalance {
                pool,
                needed,
                available,
            } => write!(
                f,
                "pool {pool} balance {available} cannot cover share {needed}"
            ),
            Self::NoAuthors { placement_id } => {
                write!(f, "placement {placement_id} has no content authors to reward")
            }
            Self::Policy(err) => write!(f, "invalid reward policy: {err}"),
            Self::Ledger(err) => write!(f, "ledger error: {err}"),
            Self::Money(err) => write!(f, "money error: {err}"),
            Self::Charge(err) => write!(f, "campaign charge refused: {err}"),
        }
    }
}

impl std::error::Error for RewardError {}

impl From<PolicyError> for RewardError {
    fn from(err: PolicyError) -> Self {
        Self::Policy(err)
    }
}

impl From<LedgerError> for RewardError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<MoneyError> for RewardError {
    fn from(err: MoneyError) -> Self {
        Self::Money(err)
    }
}

impl From<StoreError> for RewardError {
    fn from(err: StoreError) -> Self {
        Self::Charge(err)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of one share distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The share was paid out in one balanced transaction.
    Paid { transaction_id: Uuid, total: Ust },
    /// The `(placement, kind)` key was already marked applied; no-op.
    AlreadyApplied,
    /// The configured share is zero; nothing to pay.
    NothingToPay,
}

/// Result of a composed per-placement settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionReport {
    pub creator: ShareOutcome,
    pub farming: ShareOutcome,
    pub viewer: ShareOutcome,
    /// Spend charge applied to the campaign after settlement.
    pub charge: ChargeOutcome,
}

// ---------------------------------------------------------------------------
// RewardDistributor
// ---------------------------------------------------------------------------

/// Drives ledger transactions that pay out the shares of one placement.
#[derive(Debug, Clone)]
pub struct RewardDistributor {
    store: MemoryStore,
    /// Platform account that owns the social-reward funding wallets.
    platform_account: Uuid,
}

impl RewardDistributor {
    pub fn new(store: MemoryStore, platform_account: Uuid) -> Self {
        Self {
            store,
            platform_account,
        }
    }

    // -----------------------------------------------------------------------
    // Independently-callable share distributions
    // -----------------------------------------------------------------------

    /// Pay the creator share, split evenly across distinct direct authors.
    pub fn distribute_content_creator_reward(
        &self,
        placement: &AdsPlacement,
        reward: &AdsSocialReward,
    ) -> Result<ShareOutcome, RewardError> {
        self.store
            .with_transaction(|session| self.creator_reward_in(session, placement, reward))
    }

    /// Pay the farming share, same author set, sourced from the farming pool.
    pub fn distribute_content_farming_reward(
        &self,
        placement: &AdsPlacement,
        reward: &AdsSocialReward,
    ) -> Result<ShareOutcome, RewardError> {
        self.store
            .with_transaction(|session| self.farming_reward_in(session, placement, reward))
    }

    /// Pay the viewer share, whole, to the viewing account.
    pub fn distribute_viewer_reward(
        &self,
        placement: &AdsPlacement,
        reward: &AdsSocialReward,
    ) -> Result<ShareOutcome, RewardError> {
        self.store
            .with_transaction(|session| self.viewer_reward_in(session, placement, reward))
    }

    /// Session-scoped variants, for composition into a larger unit of work.
    pub fn creator_reward_in(
        &self,
        session: &mut StoreSession<'_>,
        placement: &AdsPlacement,
        reward: &AdsSocialReward,
    ) -> Result<ShareOutcome, RewardError> {
        self.split_share_in(
            session,
            placement,
            RewardKind::Creator,
            reward.creator_share,
            codes::SOCIAL_REWARD_PERSONAL,
        )
    }

    pub fn farming_reward_in(
        &self,
        session: &mut StoreSession<'_>,
        placement: &AdsPlacement,
        reward: &AdsSocialReward,
    ) -> Result<ShareOutcome, RewardError> {
        self.split_share_in(
            session,
            placement,
            RewardKind::Farming,
            reward.farming_share,
            codes::SOCIAL_REWARD_FARMING,
        )
    }

    pub fn viewer_reward_in(
        &self,
        session: &mut StoreSession<'_>,
        placement: &AdsPlacement,
        reward: &AdsSocialReward,
    ) -> Result<ShareOutcome, RewardError> {
        let share = reward.viewer_share;
        if share.is_zero() {
            return Ok(ShareOutcome::NothingToPay);
        }
        if session.reward_applied(placement.id, RewardKind::Viewer) {
            return Ok(ShareOutcome::AlreadyApplied);
        }
        self.check_pool(session, codes::SOCIAL_REWARD_PERSONAL, share)?;

        let tx = Ledger::record_transaction_in(
            session,
            Some(TransactionLeg::new(
                self.platform_account,
                WalletType::CastcleSocial,
                share,
            )),
            vec![TransactionLeg::new(
                placement.viewer,
                WalletType::Personal,
                share,
            )],
            vec![LedgerEntry {
                debit: EntryLine::new(codes::SOCIAL_REWARD_PERSONAL, share),
                credit: EntryLine::new(codes::USER_PERSONAL, share),
            }],
        )?;
        session.mark_reward_applied(placement.id, RewardKind::Viewer);

        tracing::info!(
            placement = %placement.id,
            viewer = %placement.viewer,
            total = %share,
            "viewer reward paid"
        );
        Ok(ShareOutcome::Paid {
            transaction_id: tx.id,
            total: share,
        })
    }

    // -----------------------------------------------------------------------
    // Composed settlement
    // -----------------------------------------------------------------------

    /// Settle one placement: all three shares in one atomic session, then
    /// the atomic campaign-spend charge (which auto-pauses the campaign when
    /// the daily budget is crossed).
    ///
    /// The platform share is whatever remains in the pools — it is never
    /// moved, so no transaction records it.
    pub fn distribute_ads_reward(
        &self,
        placement: &AdsPlacement,
        reward: &AdsSocialReward,
    ) -> Result<DistributionReport, RewardError> {
        validate_policy(reward)?;

        let (creator, farming, viewer) = self.store.with_transaction(|session| {
            let creator = self.creator_reward_in(session, placement, reward)?;
            let farming = self.farming_reward_in(session, placement, reward)?;
            let viewer = self.viewer_reward_in(session, placement, reward)?;
            Ok::<_, RewardError>((creator, farming, viewer))
        })?;

        let charge = self
            .store
            .charge_campaign_spend(placement.campaign_id, reward.ads_cost)?;
        if charge.auto_paused {
            tracing::info!(
                campaign = %placement.campaign_id,
                daily_spent = %charge.daily_spent,
                "daily budget exhausted; campaign auto-paused"
            );
        }

        Ok(DistributionReport {
            creator,
            farming,
            viewer,
            charge,
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Shared creator/farming path: split `share` across distinct authors
    /// out of `pool_code` as one multi-leg balanced transaction.
    fn split_share_in(
        &self,
        session: &mut StoreSession<'_>,
        placement: &AdsPlacement,
        kind: RewardKind,
        share: Ust,
        pool_code: &str,
    ) -> Result<ShareOutcome, RewardError> {
        if share.is_zero() {
            return Ok(ShareOutcome::NothingToPay);
        }
        if session.reward_applied(placement.id, kind) {
            return Ok(ShareOutcome::AlreadyApplied);
        }

        let authors = distinct_authors(&placement.contents);
        if authors.is_empty() {
            return Err(RewardError::NoAuthors {
                placement_id: placement.id,
            });
        }
        self.check_pool(session, pool_code, share)?;

        let parts = share.split_even(authors.len())?;
        let to: Vec<TransactionLeg> = authors
            .iter()
            .zip(parts.iter())
            .map(|(author, part)| TransactionLeg::new(*author, WalletType::Personal, *part))
            .collect();
        let entries: Vec<LedgerEntry> = parts
            .iter()
            .map(|part| LedgerEntry {
                debit: EntryLine::new(pool_code, *part),
                credit: EntryLine::new(codes::USER_PERSONAL, *part),
            })
            .collect();

        let tx = Ledger::record_transaction_in(
            session,
            Some(TransactionLeg::new(
                self.platform_account,
                WalletType::CastcleSocial,
                share,
            )),
            to,
            entries,
        )?;
        session.mark_reward_applied(placement.id, kind);

        tracing::info!(
            placement = %placement.id,
            kind = ?kind,
            authors = authors.len(),
            total = %share,
            "reward share paid"
        );
        Ok(ShareOutcome::Paid {
            transaction_id: tx.id,
            total: share,
        })
    }

    /// Refuse to draw more than the pool holds.  Uses the session view, so
    /// earlier staged payouts of the same session count against the pool.
    fn check_pool(
        &self,
        session: &StoreSession<'_>,
        pool_code: &str,
        needed: Ust,
    ) -> Result<(), RewardError> {
        let available = Ledger::balance_in(session, pool_code)?;
        if available < needed {
            tracing::warn!(
                pool = pool_code,
                %needed,
                %available,
                "insufficient pool balance; share skipped"
            );
            return Err(RewardError::InsufficientPoolBalance {
                pool: pool_code.to_string(),
                needed,
                available,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests (fixture-light; full scenarios live in adx-testkit)
// ---------------------------------------------------------------------------

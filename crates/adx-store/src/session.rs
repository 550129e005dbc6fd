//! Store session — the unit-of-work handle passed to transactional closures.
//!
//! A session wraps a working copy of the store state.  Every write lands in
//! the working copy immediately (so the session reads its own writes) and
//! becomes visible to other readers only when the enclosing
//! [`MemoryStore::with_transaction`](crate::MemoryStore::with_transaction)
//! commits.

use crate::StoreState;

use adx_schemas::{Account, AdsCampaign, RewardKind, Transaction};
use uuid::Uuid;

/// Mutable unit-of-work over one store transaction.
pub struct StoreSession<'a> {
    state: &'a mut StoreState,
}

impl<'a> StoreSession<'a> {
    pub(crate) fn new(state: &'a mut StoreState) -> Self {
        Self { state }
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    pub fn account(&self, code: &str) -> Option<&Account> {
        self.state.accounts.get(code)
    }

    /// Insert or replace an account document.  Uniqueness and parent checks
    /// are the chart-of-accounts' responsibility, not the store's.
    pub fn put_account(&mut self, account: Account) {
        self.state.accounts.insert(account.code.clone(), account);
    }

    // -----------------------------------------------------------------------
    // Ledger transactions
    // -----------------------------------------------------------------------

    /// Append an immutable ledger transaction.
    pub fn append_transaction(&mut self, tx: Transaction) {
        self.state.transactions.push(tx);
    }

    /// All transactions visible to this session (committed + staged).
    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    // -----------------------------------------------------------------------
    // Campaigns
    // -----------------------------------------------------------------------

    pub fn campaign(&self, id: Uuid) -> Option<&AdsCampaign> {
        self.state.campaigns.get(&id)
    }

    pub fn put_campaign(&mut self, campaign: AdsCampaign) {
        self.state.campaigns.insert(campaign.id, campaign);
    }

    pub fn remove_campaign(&mut self, id: Uuid) -> Option<AdsCampaign> {
        self.state.campaigns.remove(&id)
    }

    // -----------------------------------------------------------------------
    // Reward idempotency keys
    // -----------------------------------------------------------------------

    pub fn reward_applied(&self, placement_id: Uuid, kind: RewardKind) -> bool {
        self.state.applied_rewards.contains(&(placement_id, kind))
    }

    /// Record that the `(placement, kind)` share has been distributed.
    /// Committed together with the ledger writes of the same session, which
    /// is what makes partial-failure retry safe.
    pub fn mark_reward_applied(&mut self, placement_id: Uuid, kind: RewardKind) {
        self.state.applied_rewards.insert((placement_id, kind));
    }
}

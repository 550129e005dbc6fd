//! adx-ledger
//!
//! Double-entry bookkeeping over the document store:
//! - [`chart`] — the chart of accounts (where money can live)
//! - [`ledger`] — append-only balanced transactions and balance queries
//! - [`wallet`] — owner/wallet-type balance projection and transfers
//!
//! The ledger is append-only and order-agnostic: balances are derived by
//! aggregation, never stored.  Corrections are new offsetting transactions.

pub mod chart;
pub mod ledger;
pub mod wallet;

pub use chart::{ChartError, ChartOfAccounts};
pub use ledger::{Ledger, LedgerError};
pub use wallet::WalletService;

/// Default chart-of-accounts codes used by the reward pipeline.
///
/// The creator and farming pools are distinct codes on purpose: they may be
/// funded from the same upstream source but must never be conflated in the
/// ledger.
pub mod codes {
    /// Platform treasury (debit nature).
    pub const TREASURY: &str = "TREASURY";
    /// Advertiser ads-credit pool (credit nature).
    pub const ADS_CREDIT: &str = "ADS_CREDIT";
    /// Social-reward parent account (credit nature).
    pub const SOCIAL_REWARD: &str = "SOCIAL_REWARD";
    /// Creator + viewer reward pool.
    pub const SOCIAL_REWARD_PERSONAL: &str = "SOCIAL_REWARD.PERSONAL";
    /// Content-farming reward pool.
    pub const SOCIAL_REWARD_FARMING: &str = "SOCIAL_REWARD.FARMING";
    /// Aggregate user personal-wallet liability.
    pub const USER_PERSONAL: &str = "USER.PERSONAL";
}

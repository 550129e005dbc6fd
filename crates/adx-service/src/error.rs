//! Structured error taxonomy for the inbound API.
//!
//! Validation and not-found failures surface to the caller as structured
//! variants; ledger invariant violations indicate bugs and are logged at
//! error severity where they are detected; oracle failures never reach this
//! type at all (they degrade inside `get_ads`).

use adx_auction::RankError;
use adx_campaign::{TransitionError, ValidationError};
use adx_ledger::{ChartError, LedgerError};
use adx_reward::RewardError;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed campaign input.
    Validation(ValidationError),
    /// Campaign or account absent.
    NotFound { id: Uuid },
    /// Illegal lifecycle transition.
    Transition(TransitionError),
    /// Chart-of-accounts shape violation.
    Chart(ChartError),
    /// Ledger invariant violation — a bug, never user-triggerable.
    Ledger(LedgerError),
    /// Reward distribution failure (insufficient pool, refused charge, …).
    Reward(RewardError),
    /// Auction ranking failure on malformed inputs.
    Rank(RankError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation: {err}"),
            Self::NotFound { id } => write!(f, "not found: {id}"),
            Self::Transition(err) => write!(f, "{err}"),
            Self::Chart(err) => write!(f, "chart of accounts: {err}"),
            Self::Ledger(err) => write!(f, "{err}"),
            Self::Reward(err) => write!(f, "{err}"),
            Self::Rank(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<TransitionError> for EngineError {
    fn from(err: TransitionError) -> Self {
        Self::Transition(err)
    }
}

impl From<ChartError> for EngineError {
    fn from(err: ChartError) -> Self {
        Self::Chart(err)
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<RewardError> for EngineError {
    fn from(err: RewardError) -> Self {
        Self::Reward(err)
    }
}

impl From<RankError> for EngineError {
    fn from(err: RankError) -> Self {
        Self::Rank(err)
    }
}

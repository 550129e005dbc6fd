//! adx-auction
//!
//! CPM auction ranking for ad impressions:
//! - [`ranker`] — the pure ranking algorithm (no IO, no time, no
//!   randomness; two calls with the same inputs produce the same order).
//! - [`oracle`] — the personalization-oracle boundary and its best-effort
//!   degradation (ad serving never blocks on the scoring service).

pub mod oracle;
pub mod ranker;

pub use oracle::{fetch_scores_degraded, OracleError, RelevanceOracle, RelevanceScores};
pub use ranker::{is_servable, rank_ads, RankError};

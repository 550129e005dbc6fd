//! Personalization-oracle boundary.
//!
//! The oracle is an external ML scoring service and strictly best-effort:
//! when it is down or slow the auction degrades to zero relevance for every
//! candidate (pure bid-value order for `Auto` campaigns) instead of failing
//! the impression request.

use std::collections::HashMap;

use uuid::Uuid;

/// `content_id -> relevance score in [0, 1]` for one viewer.
pub type RelevanceScores = HashMap<Uuid, f64>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures an oracle implementation may return.  Callers of
/// [`fetch_scores_degraded`] never see these; they are logged and converted
/// to the zero-score fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The scoring service could not be reached.
    Unavailable { reason: String },
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { reason } => {
                write!(f, "personalization oracle unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for OracleError {}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The external relevance-scoring collaborator.
///
/// Implementations may omit entries for contents they cannot score; missing
/// entries are treated as zero relevance by the ranker.
pub trait RelevanceOracle {
    fn personalize_contents(
        &self,
        viewer: Uuid,
        content_ids: &[Uuid],
    ) -> Result<RelevanceScores, OracleError>;
}

/// Fetch scores, degrading to the empty map (all-zero relevance) when the
/// oracle fails.  The degradation is logged but never propagated.
pub fn fetch_scores_degraded(
    oracle: &dyn RelevanceOracle,
    viewer: Uuid,
    content_ids: &[Uuid],
) -> RelevanceScores {
    match oracle.personalize_contents(viewer, content_ids) {
        Ok(scores) => scores,
        Err(err) => {
            tracing::warn!(%viewer, error = %err, "oracle degraded to zero relevance");
            RelevanceScores::new()
        }
    }
}

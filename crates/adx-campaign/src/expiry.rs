//! Duration-based campaign expiry.

use adx_schemas::AdsCampaign;
use chrono::{DateTime, Duration, Utc};

/// The instant this campaign's configured duration elapses.
pub fn expires_at(campaign: &AdsCampaign) -> DateTime<Utc> {
    campaign.created_at + Duration::days(i64::from(campaign.detail.duration_days))
}

/// Whether the campaign's duration has elapsed at `now`.
pub fn is_expired(campaign: &AdsCampaign, now: DateTime<Utc>) -> bool {
    now >= expires_at(campaign)
}

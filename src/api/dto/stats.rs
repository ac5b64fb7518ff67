//! DTOs for link statistics.

use serde::Serialize;

use crate::application::services::LinkStats;

/// Click count for a short link.
///
/// Clicks still waiting in the ingestion queue are not counted yet.
#[derive(Debug, Serialize)]
pub struct LinkStatsResponse {
    pub short_code: String,
    pub long_url: String,
    pub total_clicks: i64,
}

impl From<LinkStats> for LinkStatsResponse {
    fn from(stats: LinkStats) -> Self {
        Self {
            short_code: stats.link.code,
            long_url: stats.link.long_url,
            total_clicks: stats.total_clicks,
        }
    }
}

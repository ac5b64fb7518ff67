//! Click entity representing a single persisted redirect.

use chrono::{DateTime, Utc};

/// A click recorded when a short link is followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl Click {
    /// Creates a new Click instance.
    ///
    /// Client metadata is optional: headers may be missing and the peer
    /// address is unavailable in some deployments.
    pub fn new(
        id: i64,
        link_id: i64,
        clicked_at: DateTime<Utc>,
        user_agent: Option<String>,
        ip: Option<String>,
    ) -> Self {
        Self {
            id,
            link_id,
            clicked_at,
            user_agent,
            ip,
        }
    }
}

/// Input data for appending a click to the click store.
///
/// The timestamp is taken when the redirect happened, not when a worker
/// persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl NewClick {
    pub fn into_click(self, id: i64) -> Click {
        Click::new(id, self.link_id, self.clicked_at, self.user_agent, self.ip)
    }
}

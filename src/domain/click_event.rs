//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewClick;

/// An in-memory representation of a click event for async processing.
///
/// Created by the redirect handler and handed to the
/// [`crate::domain::click_pipeline::ClickPipeline`]. The HTTP response never
/// waits for the event to be persisted.
///
/// # Usage Flow
///
/// 1. Created in redirect handler with request metadata
/// 2. Submitted to the pipeline (non-blocking, may be dropped when full)
/// 3. Dequeued by exactly one worker
/// 4. Converted to [`NewClick`] and appended to the click store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    ///
    /// # Arguments
    ///
    /// - `link_id` - Store id of the link that was followed
    /// - `ip` - Optional client address
    /// - `user_agent` - Optional User-Agent header
    pub fn new(link_id: i64, ip: Option<String>, user_agent: Option<&str>) -> Self {
        Self {
            link_id,
            clicked_at: Utc::now(),
            user_agent: user_agent.map(|s| s.to_string()),
            ip,
        }
    }

    /// Converts the event into the click store's insert type.
    pub fn into_new_click(self) -> NewClick {
        NewClick {
            link_id: self.link_id,
            clicked_at: self.clicked_at,
            user_agent: self.user_agent,
            ip: self.ip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation_full() {
        let event = ClickEvent::new(7, Some("192.168.1.1".to_string()), Some("Mozilla/5.0"));

        assert_eq!(event.link_id, 7);
        assert_eq!(event.ip, Some("192.168.1.1".to_string()));
        assert_eq!(event.user_agent, Some("Mozilla/5.0".to_string()));
    }

    #[test]
    fn test_click_event_creation_minimal() {
        let event = ClickEvent::new(1, None, None);

        assert_eq!(event.link_id, 1);
        assert!(event.ip.is_none());
        assert!(event.user_agent.is_none());
    }

    #[test]
    fn test_into_new_click_keeps_timestamp() {
        let event = ClickEvent::new(3, Some("10.0.0.1".to_string()), Some("curl/8.0"));
        let clicked_at = event.clicked_at;

        let new_click = event.into_new_click();

        assert_eq!(new_click.link_id, 3);
        assert_eq!(new_click.clicked_at, clicked_at);
        assert_eq!(new_click.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(new_click.ip.as_deref(), Some("10.0.0.1"));
    }
}

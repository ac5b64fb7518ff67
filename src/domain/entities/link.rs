//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL.
///
/// The short code is unique across the store for its whole lifetime. Links are
/// never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(id: i64, code: String, long_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            long_url,
            created_at,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}

impl NewLink {
    /// Builds an insert stamped with the current time.
    pub fn now(code: String, long_url: String) -> Self {
        Self {
            code,
            long_url,
            created_at: Utc::now(),
        }
    }

    /// Materializes the persisted link once the store has assigned an id.
    pub fn into_link(self, id: i64) -> Link {
        Link::new(id, self.code, self.long_url, self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let link = Link::new(
            1,
            "abc123".to_string(),
            "https://example.com".to_string(),
            now,
        );

        assert_eq!(link.id, 1);
        assert_eq!(link.code, "abc123");
        assert_eq!(link.long_url, "https://example.com");
        assert_eq!(link.created_at, now);
    }

    #[test]
    fn test_new_link_into_link_keeps_fields() {
        let new_link = NewLink::now("xyz789".to_string(), "https://rust-lang.org".to_string());
        let created_at = new_link.created_at;

        let link = new_link.into_link(42);

        assert_eq!(link.id, 42);
        assert_eq!(link.code, "xyz789");
        assert_eq!(link.long_url, "https://rust-lang.org");
        assert_eq!(link.created_at, created_at);
    }
}

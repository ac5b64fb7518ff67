//! Link liveness outcomes and the probe contract used by the health monitor.

use async_trait::async_trait;
use std::fmt;

/// Outcome of probing a link's long URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkHealth {
    /// The target answered with a 2xx or 3xx status.
    Reachable { status: u16 },
    /// The target answered with a 4xx or 5xx status.
    Unreachable { status: u16 },
    /// No HTTP answer: connection failure, timeout or an unusable URL.
    Error { reason: String },
}

impl LinkHealth {
    /// Classifies an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            Self::Reachable { status }
        } else {
            Self::Unreachable { status }
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LinkHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkHealth::Reachable { status } => write!(f, "reachable ({status})"),
            LinkHealth::Unreachable { status } => write!(f, "unreachable ({status})"),
            LinkHealth::Error { reason } => write!(f, "error ({reason})"),
        }
    }
}

/// Checks whether a URL is live.
///
/// Implementations should bound their own network time; the monitor also
/// wraps every call in a timeout.
///
/// # Implementations
///
/// - [`crate::infrastructure::probe::HttpProbe`] - HTTP HEAD/GET probe
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn probe(&self, url: &str) -> LinkHealth;
}

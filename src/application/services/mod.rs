//! Business logic services for the application layer.

pub mod link_monitor;
pub mod link_service;
pub mod stats_service;

pub use link_monitor::{LinkMonitor, MonitorConfig, SweepReport};
pub use link_service::{CodePolicy, LinkService};
pub use stats_service::{LinkStats, StatsService};

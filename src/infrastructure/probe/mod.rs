//! Outbound liveness checks for long URLs.
//!
//! - [`HttpProbe`] - HTTP implementation of [`crate::domain::link_health::LinkProbe`]

pub mod http_probe;

pub use http_probe::HttpProbe;

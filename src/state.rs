//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, StatsService};
use crate::domain::click_pipeline::ClickPipeline;
use crate::domain::repositories::{ClickRepository, LinkRepository};

pub type DynLinkService = LinkService<dyn LinkRepository>;
pub type DynStatsService = StatsService<dyn LinkRepository, dyn ClickRepository>;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub stats_service: Arc<DynStatsService>,
    pub click_pipeline: Arc<ClickPipeline>,
    /// Public prefix of short URLs, e.g. `https://s.example.com`.
    pub base_url: String,
    /// Read the client address from proxy headers.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        link_service: Arc<DynLinkService>,
        stats_service: Arc<DynStatsService>,
        click_pipeline: Arc<ClickPipeline>,
        base_url: impl Into<String>,
        behind_proxy: bool,
    ) -> Self {
        Self {
            link_service,
            stats_service,
            click_pipeline,
            base_url: base_url.into(),
            behind_proxy,
        }
    }
}

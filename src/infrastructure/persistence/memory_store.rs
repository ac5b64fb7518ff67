//! In-process link and click store.
//!
//! Selected with `STORAGE=memory`. Nothing survives a restart; the store is
//! meant for local runs and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Click, Link, NewClick, NewLink};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

/// DashMap-backed implementation of both storage traits.
///
/// The code map's entry lock makes "check then insert" atomic per code, so
/// two creators racing on one code get exactly one success and one
/// [`AppError::Conflict`].
#[derive(Default)]
pub struct MemoryStore {
    links: DashMap<String, Link>,
    clicks: DashMap<i64, Vec<Click>>,
    next_link_id: AtomicI64,
    next_click_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clicks recorded for a link, in insertion order.
    pub fn clicks_for(&self, link_id: i64) -> Vec<Click> {
        self.clicks
            .get(&link_id)
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        match self.links.entry(new_link.code.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "links_code_key" }),
            )),
            Entry::Vacant(slot) => {
                let id = self.next_link_id.fetch_add(1, Ordering::Relaxed) + 1;
                let link = new_link.into_link(id);

                self.clicks.insert(id, Vec::new());
                slot.insert(link.clone());

                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.get(code).map(|link| link.clone()))
    }

    async fn list_all(&self) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self.links.iter().map(|e| e.value().clone()).collect();
        links.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(links)
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        self.count_by_link(link_id).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let Some(mut log) = self.clicks.get_mut(&new_click.link_id) else {
            return Err(AppError::store(
                "Click references an unknown link",
                json!({ "link_id": new_click.link_id }),
            ));
        };

        let id = self.next_click_id.fetch_add(1, Ordering::Relaxed) + 1;
        let click = new_click.into_click(id);
        log.push(click.clone());

        Ok(click)
    }

    async fn count_by_link(&self, link_id: i64) -> Result<i64, AppError> {
        Ok(self
            .clicks
            .get(&link_id)
            .map(|log| log.len() as i64)
            .unwrap_or(0))
    }
}

//! Event discovery service.
//!
//! Normalizes raw query items, delegates to the store, and degrades to an
//! empty result when the store fails. Discovery powers browse surfaces, so a
//! broken filter or database hiccup renders as "no events" rather than an
//! error page; the failure is still logged.

use std::sync::Arc;

use serde::Serialize;

use crate::config::DiscoveryConfig;
use crate::db::discovery::FilterCriteria;
use crate::db::EventDiscoveryStore;
use crate::models::EventSummary;

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResponse {
    pub events: Vec<EventSummary>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    /// The sort actually applied; unrecognized requested sorts fall back to
    /// the default, and this echoes the outcome.
    pub sort: &'static str,
}

pub struct DiscoveryService {
    store: Arc<dyn EventDiscoveryStore>,
    config: DiscoveryConfig,
}

impl DiscoveryService {
    pub fn new(store: Arc<dyn EventDiscoveryStore>, config: DiscoveryConfig) -> Self {
        Self { store, config }
    }

    pub async fn discover(&self, items: &[(String, String)]) -> DiscoveryResponse {
        let criteria = FilterCriteria::from_items(items, &self.config);
        match self.store.discover(&criteria).await {
            Ok(page) => DiscoveryResponse {
                events: page.events,
                total: page.total,
                page: criteria.page,
                limit: criteria.limit,
                sort: criteria.sort.as_str(),
            },
            Err(error) => {
                tracing::warn!(%error, "discovery query failed, returning empty result");
                DiscoveryResponse {
                    events: Vec::new(),
                    total: 0,
                    page: criteria.page,
                    limit: criteria.limit,
                    sort: criteria.sort.as_str(),
                }
            }
        }
    }
}

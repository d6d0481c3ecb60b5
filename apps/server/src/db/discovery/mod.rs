//! Event discovery engine.
//!
//! Raw query items are normalized into [`FilterCriteria`], compiled into a
//! [`DiscoveryQuery`] (one predicate tree shared by the page and count
//! statements), and executed against Postgres.

pub mod criteria;
pub mod date_bucket;
pub mod location;
pub mod predicate;
pub mod query_builder;

mod execute;

pub use criteria::FilterCriteria;
pub use query_builder::DiscoveryQuery;

use sqlx::PgPool;

use crate::models::EventSummary;

/// One page of discovery results plus the total number of distinct matches.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryPage {
    pub events: Vec<EventSummary>,
    pub total: i64,
}

/// Postgres-backed implementation of [`crate::db::EventDiscoveryStore`].
#[derive(Clone)]
pub struct DiscoveryEngine {
    db_pool: PgPool,
}

impl DiscoveryEngine {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

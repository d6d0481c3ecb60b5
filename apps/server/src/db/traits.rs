//! Storage seam for the discovery services.
//!
//! Services depend on this trait rather than on `sqlx` directly, so their
//! degradation behavior can be exercised with in-memory stores.

use async_trait::async_trait;

use crate::db::discovery::{DiscoveryPage, FilterCriteria};
use crate::error::Result;

#[async_trait]
pub trait EventDiscoveryStore: Send + Sync {
    /// Fetch one page of matching events together with the total count of
    /// distinct matches. Both come from the same compiled predicate.
    async fn discover(&self, criteria: &FilterCriteria) -> Result<DiscoveryPage>;

    /// Distinct free-text event locations containing the query.
    async fn event_location_corpus(&self, query: &str) -> Result<Vec<String>>;

    /// Distinct structured city names containing the query.
    async fn structured_city_corpus(&self, query: &str) -> Result<Vec<String>>;
}

//! City autocomplete service.
//!
//! Candidates come from two corpora fetched concurrently: city tokens
//! extracted from free-text event locations, and structured city names.
//! Candidates are deduplicated, ranked prefix-first, and truncated. Failures
//! degrade to an empty suggestion list.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use treff_cities::{extract_city, rank_cities};

use crate::config::DiscoveryConfig;
use crate::db::EventDiscoveryStore;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct CitySearchResponse {
    pub cities: Vec<String>,
}

pub struct CityAutocompleteService {
    store: Arc<dyn EventDiscoveryStore>,
    config: DiscoveryConfig,
}

impl CityAutocompleteService {
    pub fn new(store: Arc<dyn EventDiscoveryStore>, config: DiscoveryConfig) -> Self {
        Self { store, config }
    }

    pub async fn search(&self, query: &str, limit: Option<usize>) -> CitySearchResponse {
        let query = query.trim();
        if query.chars().count() < self.config.autocomplete_min_query_len {
            return CitySearchResponse { cities: Vec::new() };
        }
        let limit = limit
            .filter(|&l| l >= 1)
            .unwrap_or(self.config.autocomplete_limit);

        match self.candidates(query).await {
            Ok(candidates) => CitySearchResponse {
                cities: rank_cities(candidates, query, limit),
            },
            Err(error) => {
                tracing::warn!(%error, "city autocomplete failed, returning no suggestions");
                CitySearchResponse { cities: Vec::new() }
            }
        }
    }

    async fn candidates(&self, query: &str) -> Result<Vec<String>> {
        let (locations, cities) = futures::try_join!(
            self.store.event_location_corpus(query),
            self.store.structured_city_corpus(query)
        )?;

        let mut seen = HashSet::new();
        for location in &locations {
            if let Some(city) = extract_city(location) {
                seen.insert(city);
            }
        }
        for city in cities {
            let city = city.trim();
            if !city.is_empty() {
                seen.insert(city.to_string());
            }
        }
        Ok(seen.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::discovery::{DiscoveryPage, FilterCriteria};
    use crate::error::Error;
    use async_trait::async_trait;

    struct StubStore {
        locations: Vec<String>,
        cities: Vec<String>,
        fail: bool,
    }

    impl StubStore {
        fn ok(locations: &[&str], cities: &[&str]) -> Self {
            Self {
                locations: locations.iter().map(|s| s.to_string()).collect(),
                cities: cities.iter().map(|s| s.to_string()).collect(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                locations: Vec::new(),
                cities: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl EventDiscoveryStore for StubStore {
        async fn discover(&self, _criteria: &FilterCriteria) -> Result<DiscoveryPage> {
            Ok(DiscoveryPage::default())
        }

        async fn event_location_corpus(&self, _query: &str) -> Result<Vec<String>> {
            if self.fail {
                return Err(Error::Internal("connection refused".to_string()));
            }
            Ok(self.locations.clone())
        }

        async fn structured_city_corpus(&self, _query: &str) -> Result<Vec<String>> {
            Ok(self.cities.clone())
        }
    }

    fn service(store: StubStore) -> CityAutocompleteService {
        CityAutocompleteService::new(Arc::new(store), DiscoveryConfig::default())
    }

    #[tokio::test]
    async fn merges_extracted_and_structured_cities() {
        let service = service(StubStore::ok(
            &["Venue, Berlin, DE", "Warehouse, Berlingen"],
            &["Berlin", "Hamburg"],
        ));
        let response = service.search("berl", None).await;
        // "Berlin" from both corpora appears once; prefix matches sort first
        // and "Hamburg" is filtered out by the ranker.
        assert_eq!(response.cities, vec!["Berlin", "Berlingen"]);
    }

    #[tokio::test]
    async fn short_queries_return_no_suggestions() {
        let service = service(StubStore::ok(&["Venue, Berlin, DE"], &[]));
        for query in ["", "b", "  b  "] {
            let response = service.search(query, None).await;
            assert!(response.cities.is_empty(), "query {query:?}");
        }
    }

    #[tokio::test]
    async fn limit_overrides_config_default() {
        let service = service(StubStore::ok(
            &[],
            &["Berlin", "Bergen", "Bernau", "Berwick"],
        ));
        let response = service.search("ber", Some(2)).await;
        assert_eq!(response.cities.len(), 2);
    }

    #[tokio::test]
    async fn zero_limit_falls_back_to_default() {
        let service = service(StubStore::ok(&[], &["Berlin"]));
        let response = service.search("ber", Some(0)).await;
        assert_eq!(response.cities, vec!["Berlin"]);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_empty_list() {
        let service = service(StubStore::failing());
        let response = service.search("berlin", None).await;
        assert!(response.cities.is_empty());
    }
}

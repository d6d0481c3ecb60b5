//! Service layer between the HTTP handlers and the store.

pub mod cities;
pub mod discovery;

pub use cities::{CityAutocompleteService, CitySearchResponse};
pub use discovery::{DiscoveryResponse, DiscoveryService};

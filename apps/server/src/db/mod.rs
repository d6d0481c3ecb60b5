//! Database layer: the discovery engine and the storage trait it implements.

pub mod discovery;
pub mod traits;

pub use discovery::DiscoveryEngine;
pub use traits::EventDiscoveryStore;

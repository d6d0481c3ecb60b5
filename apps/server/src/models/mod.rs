//! Domain models for the discovery server

pub mod event;

pub use event::{
    map_external_type, Category, EventSummary, Sort, Visibility, EXTERNAL_EVENT_TYPES,
};

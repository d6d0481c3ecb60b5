//! Treff - event discovery platform backend
//!
//! An HTTP service for browsing and filtering events whose location and
//! scheduling data are spread across three overlapping representations:
//! - a legacy free-text location on the event itself,
//! - one-or-many scheduled occurrences per event,
//! - an optional structured location row per occurrence.
//!
//! The core of the crate is the discovery engine (`db::discovery`): it turns
//! a set of optional filter criteria into one typed predicate tree that is
//! compiled to SQL exactly once and shared by the paged data query and the
//! distinct-count query, so result pages and totals can never diverge.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;

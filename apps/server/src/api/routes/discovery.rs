//! Discovery route table.

use axum::{routing::get, Router};

use crate::api::handlers;
use crate::state::AppState;

pub fn discovery_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::events::discover_events))
        .route("/cities/search", get(handlers::cities::search_cities))
}

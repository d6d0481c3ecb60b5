//! City autocomplete handler.

use axum::extract::{RawQuery, State};
use axum::Json;

use crate::api::handlers::parse_query_items;
use crate::services::CitySearchResponse;
use crate::state::AppState;

/// GET /api/cities/search?query=...&limit=...
#[tracing::instrument(skip_all)]
pub async fn search_cities(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Json<CitySearchResponse> {
    let mut query = String::new();
    let mut limit = None;
    for (key, value) in parse_query_items(raw.as_deref()) {
        match key.as_str() {
            "query" | "q" => query = value,
            "limit" => limit = value.parse::<usize>().ok(),
            _ => {}
        }
    }
    Json(state.city_service.search(&query, limit).await)
}

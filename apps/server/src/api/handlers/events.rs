//! Event discovery handler.

use axum::extract::{RawQuery, State};
use axum::Json;

use crate::api::handlers::parse_query_items;
use crate::services::DiscoveryResponse;
use crate::state::AppState;

/// GET /api/events
///
/// Infallible by design: malformed filters fall back to defaults and store
/// failures surface as an empty page, so browse surfaces always render.
#[tracing::instrument(skip_all)]
pub async fn discover_events(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Json<DiscoveryResponse> {
    let items = parse_query_items(raw.as_deref());
    Json(state.discovery_service.discover(&items).await)
}

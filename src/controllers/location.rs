use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};

use crate::{middleware::client_ip, services::geolocation::resolve_observer, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/location", get(current_location))
}

/// Where distances should be measured from. Never fails: lookup problems
/// yield the default location together with a status message.
pub async fn current_location(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Value> {
    let timeout = Duration::from_secs(state.config.geolocation.timeout_seconds);
    let resolved = resolve_observer(
        state.locator.as_ref(),
        client_ip(&headers),
        timeout,
        &state.default_observer,
    )
    .await;

    Json(json!({ "success": true, "location": resolved }))
}

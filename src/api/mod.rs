pub mod error;
pub mod events;
pub mod stream;

use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::json;

use crate::auth::auth_middleware;
use crate::AppState;

async fn health_check() -> Response {
    Json(json!({"status": "ok"})).into_response()
}

/// All HTTP routes, authenticated with the configured token
pub fn router(state: AppState) -> Router {
    let settings = state.settings.clone();

    Router::new()
        // Health check
        .route("/api", get(health_check))
        // Event streams and manual publishing
        .route(
            "/api/events/reviews",
            get(stream::review_stream).post(events::publish_review),
        )
        .route(
            "/api/events/imports",
            get(stream::import_stream).post(events::publish_import),
        )
        .route("/api/events/status", get(events::get_status))
        .layer(middleware::from_fn_with_state(settings, auth_middleware))
        .with_state(state)
}

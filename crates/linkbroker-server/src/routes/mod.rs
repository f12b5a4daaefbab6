//! HTTP route handlers.

pub mod connections;
pub mod login;
pub mod profile;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::state::AppState;

/// Build the Axum router: bearer-gated endpoints plus a JSON 404 fallback.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(login::routes())
        .merge(connections::routes())
        .merge(profile::routes())
        // route_layer gates only the matched routes; the fallback stays open.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
}

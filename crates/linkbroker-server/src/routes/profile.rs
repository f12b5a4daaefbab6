//! Own-profile endpoint.
//!
//! Same session and failure semantics as /connections; the provider's
//! profile body passes through untouched.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::error;

use linkbroker_gateway::GatewayOutcome;

use crate::routes::connections::{provider_failure, NO_SESSION_MESSAGE};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/my-profile", get(my_profile))
}

async fn my_profile(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let Some(session) = state.store.load() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": NO_SESSION_MESSAGE })),
        );
    };

    match state.gateway.fetch_profile(&session).await {
        Ok(GatewayOutcome::Success(body)) => (StatusCode::OK, Json(body)),
        Ok(GatewayOutcome::Failure { status, body }) => provider_failure(status, body),
        Err(e) => {
            error!("provider unreachable: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": true, "message": e.to_string() })),
            )
        }
    }
}

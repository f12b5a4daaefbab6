//! Paginated connections endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::error;

use linkbroker_gateway::{normalize_connections, GatewayOutcome};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/connections", get(connections))
}

pub(crate) const NO_SESSION_MESSAGE: &str =
    "No cookies found, please POST /login-linkedin first.";

/// Parse a paging parameter: absent falls back to the default, anything
/// that is not a positive integer is rejected.
fn paging_param(
    query: &HashMap<String, String>,
    key: &str,
    default: u32,
) -> Result<u32, String> {
    match query.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|v| *v >= 1)
            .ok_or_else(|| format!("{} must be a positive integer", key)),
    }
}

async fn connections(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let (page, size) = match (
        paging_param(&query, "page", 1),
        paging_param(&query, "size", 10),
    ) {
        (Ok(page), Ok(size)) => (page, size),
        (Err(e), _) | (_, Err(e)) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e })))
        }
    };

    let Some(session) = state.store.load() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": NO_SESSION_MESSAGE })),
        );
    };

    match state.gateway.fetch_connections(&session, page, size).await {
        Ok(GatewayOutcome::Success(body)) => {
            let records = normalize_connections(&body);
            (
                StatusCode::OK,
                Json(json!({
                    "page": page,
                    "size": size,
                    "connections": records,
                })),
            )
        }
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

/// Pass the provider's rejection through with its own status code.
pub(crate) fn provider_failure(status: u16, body: String) -> (StatusCode, Json<Value>) {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        code,
        Json(json!({ "error": true, "status_code": status, "body": body })),
    )
}

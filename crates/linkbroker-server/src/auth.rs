//! Bearer-token authentication for the broker's own API.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Outcome of checking one Authorization header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Token matches the configured secret.
    Ok,
    /// Header missing or not of the `Bearer <token>` form.
    Unauthorized,
    /// Well-formed header, wrong token.
    Forbidden,
}

/// Pure check of an Authorization header value against the secret.
pub fn check(header: Option<&str>, secret: &str) -> AuthOutcome {
    let Some(header) = header else {
        return AuthOutcome::Unauthorized;
    };
    let Some(token) = header.strip_prefix("Bearer ") else {
        return AuthOutcome::Unauthorized;
    };
    if safe_equal(token, secret) {
        AuthOutcome::Ok
    } else {
        AuthOutcome::Forbidden
    }
}

/// Constant-time comparison; the secret must not leak through timing.
fn safe_equal(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Middleware gating the protected routes.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    match check(header, &state.config.api_token) {
        AuthOutcome::Ok => next.run(request).await,
        AuthOutcome::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response(),
        AuthOutcome::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Forbidden" })),
        )
            .into_response(),
    }
}

//! Interactive login endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use linkbroker_browser::LoginError;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/login-linkedin", post(login))
}

/// Run the browser login and persist the captured session.
///
/// Logins are single-flight: a second request blocks on the lock and then
/// performs its own (fresh) login. Data reads against the previous session
/// are unaffected while this runs.
async fn login(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let Some(credentials) = state.config.credentials.clone() else {
        error!("login requested but provider credentials are not configured");
        return login_failed(LoginError::MissingCredentials);
    };

    let _guard = state.login_lock.lock().await;

    let deadline = Duration::from_secs(state.config.login_timeout_secs);
    let attempt = tokio::time::timeout(
        deadline,
        state.agent.login(&credentials.username, &credentials.password),
    )
    .await;

    let cookies = match attempt {
        Ok(Ok(cookies)) => cookies,
        Ok(Err(e)) => {
            error!("login failed: {}", e);
            return login_failed(e);
        }
        Err(_) => {
            error!("login timed out after {}s", state.config.login_timeout_secs);
            return login_failed(LoginError::TimedOut);
        }
    };

    if cookies.is_empty() {
        error!("login yielded no cookies");
        return fail("Login failed: no cookies captured.");
    }

    match state.store.save(cookies) {
        Ok(record) => {
            info!(
                "logged in; {} cookies saved to {}",
                record.cookies.len(),
                state.store.path().display()
            );
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "message": "Logged in and cookies saved.",
                })),
            )
        }
        Err(e) => {
            error!("failed to persist session: {}", e);
            fail("Login succeeded but the session could not be saved.")
        }
    }
}

fn login_failed(error: LoginError) -> (StatusCode, Json<Value>) {
    fail(&format!("Login failed: {}.", error))
}

fn fail(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "fail", "message": message })),
    )
}

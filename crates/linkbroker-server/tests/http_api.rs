//! End-to-end tests of the broker's HTTP surface, with the browser login
//! replaced by a fake agent and the provider replaced by a local stub.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use linkbroker_browser::{LoginAgent, LoginError};
use linkbroker_core::{BrokerConfig, ProviderCredentials};
use linkbroker_gateway::{NoPacing, ProviderGateway};
use linkbroker_session::{SessionCookie, SessionStore};
use linkbroker_server::{build_router, AppState};

const TOKEN: &str = "test-secret";

/// Login agent whose outcome is scripted per test.
struct FakeAgent {
    calls: AtomicUsize,
    delay: Duration,
    fail: bool,
}

impl FakeAgent {
    fn succeeding() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::succeeding()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::succeeding()
        }
    }
}

#[async_trait]
impl LoginAgent for FakeAgent {
    async fn login(
        &self,
        _username: &str,
        _password: &str,
    ) -> Result<Vec<SessionCookie>, LoginError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(LoginError::NotAccepted);
        }
        Ok(vec![
            SessionCookie::new("li_at", format!("token-{}", attempt)),
            SessionCookie::new("JSESSIONID", format!("\"ajax:{}\"", attempt)),
        ])
    }
}

fn config(dir: &tempfile::TempDir) -> BrokerConfig {
    BrokerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        api_token: TOKEN.to_string(),
        credentials: Some(ProviderCredentials {
            username: "user@example.com".to_string(),
            password: "hunter2".to_string(),
        }),
        session_file: dir.path().join("cookies.json"),
        login_timeout_secs: 5,
    }
}

fn state_with(
    dir: &tempfile::TempDir,
    agent: Arc<dyn LoginAgent>,
    gateway: ProviderGateway,
) -> Arc<AppState> {
    Arc::new(AppState::new(config(dir), agent, gateway))
}

fn offline_gateway() -> ProviderGateway {
    // Points at nothing; tests using it never reach the provider.
    ProviderGateway::with_pacing(Arc::new(NoPacing))
}

async fn serve_provider(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn bearer() -> Option<&'static str> {
    Some("Bearer test-secret")
}

// ---------------------------------------------------------------
// Auth gate
// ---------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(state_with(&dir, Arc::new(FakeAgent::succeeding()), offline_gateway()));

    let (status, body) = call(&app, "GET", "/connections", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn wrong_token_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(state_with(&dir, Arc::new(FakeAgent::succeeding()), offline_gateway()));

    let (status, body) = call(&app, "POST", "/login-linkedin", Some("Bearer wrong")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Forbidden" }));
}

#[tokio::test]
async fn unmatched_route_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(state_with(&dir, Arc::new(FakeAgent::succeeding()), offline_gateway()));

    let (status, body) = call(&app, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

// ---------------------------------------------------------------
// Login
// ---------------------------------------------------------------

#[tokio::test]
async fn successful_login_saves_session() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, Arc::new(FakeAgent::succeeding()), offline_gateway());
    let app = build_router(state.clone());

    let (status, body) = call(&app, "POST", "/login-linkedin", bearer()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let record = state.store.load().expect("session saved");
    assert_eq!(record.cookie("li_at"), Some("token-1"));
}

#[tokio::test]
async fn failed_login_reports_500_and_keeps_old_session() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, Arc::new(FakeAgent::failing()), offline_gateway());
    state
        .store
        .save(vec![SessionCookie::new("li_at", "previous")])
        .unwrap();
    let app = build_router(state.clone());

    let (status, body) = call(&app, "POST", "/login-linkedin", bearer()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "fail");

    // The earlier session survives a failed login attempt.
    let record = state.store.load().expect("old session intact");
    assert_eq!(record.cookie("li_at"), Some("previous"));
}

#[tokio::test]
async fn login_without_credentials_fails_without_crashing() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&dir);
    cfg.credentials = None;
    let state = Arc::new(AppState::new(
        cfg,
        Arc::new(FakeAgent::succeeding()),
        offline_gateway(),
    ));
    let app = build_router(state);

    let (status, body) = call(&app, "POST", "/login-linkedin", bearer()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "fail");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("username/password not configured"),
        "unexpected message: {}",
        body["message"]
    );
}

#[tokio::test]
async fn login_exceeding_deadline_reports_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&dir);
    cfg.login_timeout_secs = 0;
    let state = Arc::new(AppState::new(
        cfg,
        Arc::new(FakeAgent::slow(Duration::from_millis(200))),
        offline_gateway(),
    ));
    let app = build_router(state.clone());

    let (status, body) = call(&app, "POST", "/login-linkedin", bearer()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "fail");
    assert!(
        body["message"].as_str().unwrap().contains("timed out"),
        "unexpected message: {}",
        body["message"]
    );
    // No session is written by a timed-out attempt.
    assert!(state.store.load().is_none());
}

#[tokio::test]
async fn concurrent_logins_are_single_flight() {
    let dir = tempfile::tempdir().unwrap();
    let agent = Arc::new(FakeAgent::slow(Duration::from_millis(100)));
    let state = state_with(&dir, agent.clone(), offline_gateway());
    let app = build_router(state.clone());

    let (a, b) = tokio::join!(
        call(&app, "POST", "/login-linkedin", bearer()),
        call(&app, "POST", "/login-linkedin", bearer()),
    );
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    assert_eq!(agent.calls.load(Ordering::SeqCst), 2);

    // The file is one complete attempt's cookie set, never a blend.
    let record = state.store.load().unwrap();
    let li_at = record.cookie("li_at").unwrap();
    let jsession = record.cookie("JSESSIONID").unwrap();
    let attempt = li_at.strip_prefix("token-").unwrap();
    assert_eq!(jsession, format!("\"ajax:{}\"", attempt));
}

// ---------------------------------------------------------------
// Connections
// ---------------------------------------------------------------

fn save_session(store: &SessionStore) {
    store
        .save(vec![
            SessionCookie::new("li_at", "tok"),
            SessionCookie::new("JSESSIONID", "\"ajax:1\""),
        ])
        .unwrap();
}

#[tokio::test]
async fn connections_without_session_is_unauthorized_with_guidance() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(state_with(&dir, Arc::new(FakeAgent::succeeding()), offline_gateway()));

    let (status, body) = call(&app, "GET", "/connections?page=1&size=10", bearer()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "error": "No cookies found, please POST /login-linkedin first." })
    );
}

#[tokio::test]
async fn connections_normalizes_provider_payload() {
    let provider = Router::new().route(
        "/voyager/api/relationships/connections",
        get(|| async {
            axum::Json(json!({
                "data": {
                    "elements": [
                        { "handle~": { "firstName": "Ada", "lastName": "Lovelace",
                                       "occupation": "Analyst" } },
                        { "handle~": { "firstName": "Alan", "lastName": "Turing",
                                       "occupation": "Mathematician",
                                       "emailAddress": "alan@example.com" } },
                    ]
                }
            }))
        }),
    );
    let base = serve_provider(provider).await;

    let dir = tempfile::tempdir().unwrap();
    let gateway = ProviderGateway::with_pacing(Arc::new(NoPacing)).with_base_url(base);
    let state = state_with(&dir, Arc::new(FakeAgent::succeeding()), gateway);
    save_session(&state.store);
    let app = build_router(state);

    let (status, body) = call(&app, "GET", "/connections?page=1&size=10", bearer()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["size"], 10);
    let connections = body["connections"].as_array().unwrap();
    assert_eq!(connections.len(), 2);
    assert_eq!(connections[0]["firstName"], "Ada");
    assert_eq!(connections[0]["email"], Value::Null);
    assert_eq!(connections[1]["email"], "alan@example.com");
}

#[tokio::test]
async fn provider_429_passes_through() {
    let provider = Router::new().route(
        "/voyager/api/relationships/connections",
        get(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited".to_string()) }),
    );
    let base = serve_provider(provider).await;

    let dir = tempfile::tempdir().unwrap();
    let gateway = ProviderGateway::with_pacing(Arc::new(NoPacing)).with_base_url(base);
    let state = state_with(&dir, Arc::new(FakeAgent::succeeding()), gateway);
    save_session(&state.store);
    let app = build_router(state);

    let (status, body) = call(&app, "GET", "/connections", bearer()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], true);
    assert_eq!(body["status_code"], 429);
    assert_eq!(body["body"], "rate limited");
}

#[tokio::test]
async fn extreme_paging_values_do_not_panic() {
    use axum::extract::Query;
    use std::collections::HashMap;

    let provider = Router::new().route(
        "/voyager/api/relationships/connections",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            // (u32::MAX - 1) * 2 without wrapping.
            assert_eq!(query["start"], "8589934588");
            axum::Json(json!({ "data": { "elements": [] } }))
        }),
    );
    let base = serve_provider(provider).await;

    let dir = tempfile::tempdir().unwrap();
    let gateway = ProviderGateway::with_pacing(Arc::new(NoPacing)).with_base_url(base);
    let state = state_with(&dir, Arc::new(FakeAgent::succeeding()), gateway);
    save_session(&state.store);
    let app = build_router(state);

    let (status, body) =
        call(&app, "GET", "/connections?page=4294967295&size=2", bearer()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connections"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn invalid_paging_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, Arc::new(FakeAgent::succeeding()), offline_gateway());
    save_session(&state.store);
    let app = build_router(state);

    for uri in [
        "/connections?page=0",
        "/connections?page=abc",
        "/connections?size=-1",
    ] {
        let (status, body) = call(&app, "GET", uri, bearer()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn unreachable_provider_is_a_gateway_error() {
    // Reserve a port, then close it so the connection is refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let gateway = ProviderGateway::with_pacing(Arc::new(NoPacing))
        .with_base_url(format!("http://{}", addr));
    let state = state_with(&dir, Arc::new(FakeAgent::succeeding()), gateway);
    save_session(&state.store);
    let app = build_router(state);

    let (status, body) = call(&app, "GET", "/connections", bearer()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], true);
    assert!(body["message"].is_string());
}

// ---------------------------------------------------------------
// Profile
// ---------------------------------------------------------------

#[tokio::test]
async fn my_profile_passes_provider_body_through() {
    let provider = Router::new().route(
        "/voyager/api/me",
        get(|| async { axum::Json(json!({ "miniProfile": { "firstName": "Ada" } })) }),
    );
    let base = serve_provider(provider).await;

    let dir = tempfile::tempdir().unwrap();
    let gateway = ProviderGateway::with_pacing(Arc::new(NoPacing)).with_base_url(base);
    let state = state_with(&dir, Arc::new(FakeAgent::succeeding()), gateway);
    save_session(&state.store);
    let app = build_router(state);

    let (status, body) = call(&app, "GET", "/my-profile", bearer()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["miniProfile"]["firstName"], "Ada");
}

#[tokio::test]
async fn my_profile_without_session_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(state_with(&dir, Arc::new(FakeAgent::succeeding()), offline_gateway()));

    let (status, _) = call(&app, "GET", "/my-profile", bearer()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

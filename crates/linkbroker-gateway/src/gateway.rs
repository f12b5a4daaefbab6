//! The provider gateway.
//!
//! Maps an internal paginated request onto a Voyager call carrying the
//! session's cookies, paces the call, and classifies the result. HTTP-level
//! rejections (non-200) and transport failures are kept distinct: the
//! former pass through to the caller with the provider's status and body,
//! the latter surface as [`GatewayError::Network`].

use std::sync::Arc;
use std::time::Duration;

use linkbroker_session::SessionRecord;
use reqwest::header::{ACCEPT, COOKIE, USER_AGENT};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::pacing::{PacingPolicy, RandomDelay};

const DEFAULT_BASE_URL: &str = "https://www.linkedin.com";
const CONNECTIONS_PATH: &str = "/voyager/api/relationships/connections";
const PROFILE_PATH: &str = "/voyager/api/me";
const VOYAGER_ACCEPT: &str = "application/vnd.linkedin.normalized+json+2.1";
const RESTLI_VERSION: &str = "2.0.0";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("could not reach the provider: {0}")]
    Network(#[from] reqwest::Error),
}

/// Classified provider response.
#[derive(Debug)]
pub enum GatewayOutcome {
    /// HTTP 200 with a parsed JSON body.
    Success(Value),
    /// Any other HTTP status; body passed through verbatim.
    Failure { status: u16, body: String },
}

/// Offset of the first element of `page` when pages hold `size` elements.
///
/// Widened to `u64` so extreme but boundary-valid page/size combinations
/// cannot overflow.
pub fn page_offset(page: u32, size: u32) -> u64 {
    (u64::from(page) - 1) * u64::from(size)
}

pub struct ProviderGateway {
    http: reqwest::Client,
    pacing: Arc<dyn PacingPolicy>,
    base_url: String,
}

impl ProviderGateway {
    pub fn new() -> Self {
        Self::with_pacing(Arc::new(RandomDelay::default()))
    }

    pub fn with_pacing(pacing: Arc<dyn PacingPolicy>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            pacing,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the gateway at a different host. For tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch one page of the account's connections.
    pub async fn fetch_connections(
        &self,
        session: &SessionRecord,
        page: u32,
        size: u32,
    ) -> Result<GatewayOutcome, GatewayError> {
        let start = page_offset(page, size);
        let query = [
            ("count", size.to_string()),
            ("start", start.to_string()),
            ("q", "recent".to_string()),
        ];
        self.request(CONNECTIONS_PATH, &query, session).await
    }

    /// Fetch the logged-in account's own profile.
    pub async fn fetch_profile(
        &self,
        session: &SessionRecord,
    ) -> Result<GatewayOutcome, GatewayError> {
        self.request(PROFILE_PATH, &[], session).await
    }

    async fn request(
        &self,
        path: &str,
        query: &[(&str, String)],
        session: &SessionRecord,
    ) -> Result<GatewayOutcome, GatewayError> {
        self.pacing.pause().await;

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .http
            .get(&url)
            .query(query)
            .header(ACCEPT, VOYAGER_ACCEPT)
            .header("X-RestLi-Protocol-Version", RESTLI_VERSION)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(COOKIE, session.cookie_header());

        // Voyager checks the csrf-token header against the JSESSIONID
        // cookie (sans quotes).
        if let Some(jsession) = session.cookie("JSESSIONID") {
            request = request.header("csrf-token", jsession.trim_matches('"'));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("provider {} -> {}", path, status);

        if status == reqwest::StatusCode::OK {
            let body = response.json().await?;
            Ok(GatewayOutcome::Success(body))
        } else {
            warn!("provider rejected {} with status {}", path, status);
            let body = response.text().await?;
            Ok(GatewayOutcome::Failure {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl Default for ProviderGateway {
    fn default() -> Self {
        Self::new()
    }
}

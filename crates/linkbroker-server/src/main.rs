//! linkbroker — local credential-session broker for LinkedIn's private API.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use linkbroker_browser::{ChromeConfig, ChromeLoginAgent};
use linkbroker_core::BrokerConfig;
use linkbroker_gateway::ProviderGateway;
use linkbroker_server::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BrokerConfig::from_env()?;
    if config.credentials.is_none() {
        info!("provider credentials not configured; logins will fail until they are set");
    }

    let agent = Arc::new(ChromeLoginAgent::new(ChromeConfig::default()));
    let gateway = ProviderGateway::new();
    let state = Arc::new(AppState::new(config, agent, gateway));

    let app = build_router(state.clone());

    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("broker listening on http://{}", addr);
    info!("  POST /login-linkedin               => interactive provider login");
    info!("  GET  /my-profile                   => own profile via provider");
    info!("  GET  /connections?page=1&size=10   => paginated connections");

    axum::serve(listener, app).await?;

    Ok(())
}

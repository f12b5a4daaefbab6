//! Shared application state.

use std::sync::Arc;

use linkbroker_browser::LoginAgent;
use linkbroker_core::BrokerConfig;
use linkbroker_gateway::ProviderGateway;
use linkbroker_session::SessionStore;
use tokio::sync::Mutex;

/// State shared by all route handlers.
pub struct AppState {
    pub config: BrokerConfig,
    pub store: SessionStore,
    pub agent: Arc<dyn LoginAgent>,
    pub gateway: ProviderGateway,
    /// Single-flight guard around `agent.login -> store.save`. Data reads
    /// never take this lock; they snapshot the session file directly.
    pub login_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: BrokerConfig, agent: Arc<dyn LoginAgent>, gateway: ProviderGateway) -> Self {
        let store = SessionStore::new(&config.session_file);
        Self {
            config,
            store,
            agent,
            gateway,
            login_lock: Mutex::new(()),
        }
    }
}
